use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use serde_json::Value;

use super::risk_map::{self, MapMarker};
use super::widgets;
use crate::api::timestamp;
use crate::geo::{Bounds, FIT_PADDING_PX, MAP_SIZE_PX};
use crate::pages::legacy::{LegacyPage, Station};

/// Statewide view used until stations are loaded.
const UTAH: (f64, f64) = (39.3, -111.7);
const STATION_RADIUS_PX: f64 = 6.0;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

fn map_bounds(stations: &[Station]) -> Bounds {
    let points: Vec<(f64, f64)> = stations.iter().map(|s| (s.lat, s.lon)).collect();
    Bounds::enclosing(&points)
        .map(|b| b.padded(FIT_PADDING_PX, MAP_SIZE_PX))
        .unwrap_or_else(|| Bounds::around(UTAH.0, UTAH.1, 5.0, 7.0))
}

fn station_table(page: &LegacyPage) -> Table<'static> {
    let rows: Vec<Row> = page
        .stations()
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.name.clone()),
                Cell::from(format!("{}, {}", s.lat, s.lon)),
                Cell::from(yes_no(page.prediction_for(&s.id).is_some())),
                Cell::from(yes_no(page.satellite_for(&s.id).is_some())),
            ])
        })
        .collect();
    Table::new(
        rows,
        [
            Constraint::Min(14),
            Constraint::Length(22),
            Constraint::Length(12),
            Constraint::Length(10),
        ],
    )
    .header(
        Row::new(vec!["Name", "Location", "Predictions", "Satellite"])
            .style(Style::default().fg(Color::Yellow)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
}

fn json_lines(value: &Value) -> Vec<Line<'static>> {
    serde_json::to_string_pretty(value)
        .unwrap_or_default()
        .lines()
        .map(|l| Line::from(format!(" {l}")))
        .collect()
}

fn details(page: &LegacyPage) -> Vec<Line<'static>> {
    let Some(station) = page.selected_station() else {
        return vec![Line::from(""), Line::from(" Select a station")];
    };
    let heading = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", station.name), heading)),
        Line::from(format!(" {}, {}", station.lat, station.lon)),
    ];
    if let Some(observed) = &station.latest_observed_at {
        lines.push(Line::from(format!(" Observed  {}", timestamp::iso(observed))));
    }
    if let Some(predicted) = &station.latest_predicted_at {
        lines.push(Line::from(format!(" Predicted {}", timestamp::iso(predicted))));
    }

    if let Some(weather) = &station.weather {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Weather", heading)));
        lines.extend(json_lines(weather));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Predictions", heading)));
    match page.prediction_for(&station.id) {
        Some(prediction) => {
            if let Some(probability) = station.probability() {
                let mut spans = vec![Span::raw(" ")];
                spans.extend(widgets::badge_with_label(probability).spans);
                lines.push(Line::from(spans));
            }
            lines.extend(json_lines(prediction));
        }
        None => lines.push(Line::from(" No predictions yet")),
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Satellite Images", heading)));
    match page.satellite_for(&station.id) {
        Some(shots) => lines.extend(shots.iter().map(|shot| {
            Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    shot.url.clone(),
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(
                    format!("  {}", timestamp::iso(&shot.timestamp)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })),
        None => lines.push(Line::from(" No satellite images")),
    }
    lines
}

pub fn render(f: &mut Frame, area: Rect, page: &LegacyPage) {
    let [banner, body] = Layout::vertical([
        Constraint::Length(if page.error_message().is_some() { 3 } else { 0 }),
        Constraint::Min(0),
    ])
    .areas(area);
    if let Some(message) = page.error_message() {
        f.render_widget(widgets::error_card("Error", message), banner);
    }

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(body);
    let [map_area, table_area] =
        Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)]).areas(left);

    let selected = page.selected_id();
    let markers: Vec<MapMarker> = page
        .stations()
        .iter()
        .map(|s| {
            let is_selected = selected == Some(s.id.as_str());
            MapMarker {
                lat: s.lat,
                lon: s.lon,
                radius_px: STATION_RADIUS_PX,
                color: if is_selected { Color::Yellow } else { Color::Cyan },
                label: is_selected.then(|| format!(" {}", s.name)),
            }
        })
        .collect();
    risk_map::render(
        f,
        map_area,
        super::panel("Map"),
        map_bounds(page.stations()),
        &markers,
    );

    let note = if page.is_loading() { "Loading..." } else { "" };
    let table_block = super::panel_with_note("Stations", note);
    let index = selected.and_then(|id| page.stations().iter().position(|s| s.id == id));
    let mut state = TableState::default().with_selected(index);
    f.render_stateful_widget(station_table(page).block(table_block), table_area, &mut state);

    f.render_widget(
        Paragraph::new(details(page))
            .wrap(Wrap { trim: false })
            .block(super::panel("Station Details")),
        right,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_falls_back_to_statewide_view() {
        let bounds = map_bounds(&[]);
        assert!(bounds.contains(40.76, -111.89));

        let stations = crate::pages::legacy::normalize_stations(&[json!({
            "station": "KSEA", "lat": 47.45, "lon": -122.31
        })]);
        assert!(map_bounds(&stations).contains(47.45, -122.31));
    }

    #[test]
    fn details_prompt_for_a_selection() {
        let page = LegacyPage::new();
        let text: Vec<String> = details(&page).iter().map(ToString::to_string).collect();
        assert_eq!(text[1], " Select a station");
    }
}
