use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::risk_map::{self, MapMarker};
use super::widgets;
use crate::api::fire_areas::TopItem;
use crate::api::timestamp;
use crate::app::App;
use crate::pages::dashboard::{DashboardPage, MAP_EMPTY_MESSAGE, TABLE_EMPTY_MESSAGE};
use crate::risk::{marker_radius, probability_color};

fn markers(items: &[TopItem], selected: usize) -> Vec<MapMarker> {
    let mut markers: Vec<(f64, MapMarker)> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            (
                item.probability,
                MapMarker {
                    lat: item.lat,
                    lon: item.lon,
                    radius_px: marker_radius(item.probability),
                    color: probability_color(item.probability),
                    label: (i == selected).then(|| format!(" {}", item.name)),
                },
            )
        })
        .collect();
    markers.sort_by(|a, b| a.0.total_cmp(&b.0));
    markers.into_iter().map(|(_, marker)| marker).collect()
}

fn areas_table(items: &[TopItem]) -> Table<'static> {
    let header = Row::new(vec!["#", "Area", "Location", "Predicted At (UTC)", "Probability"])
        .style(Style::default().fg(Color::Yellow));
    let rows: Vec<Row> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            Row::new(vec![
                Cell::from(format!("{}", i + 1)),
                Cell::from(item.name.clone()),
                Cell::from(format!("{:.4}, {:.4}", item.lat, item.lon)),
                Cell::from(timestamp::iso(&item.predicted_at)),
                Cell::from(Line::from(widgets::badge(item.probability))),
            ])
        })
        .collect();
    Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(12),
            Constraint::Length(20),
            Constraint::Length(24),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
}

pub fn render(f: &mut Frame, area: Rect, app: &App, page: &DashboardPage) {
    let error = page.areas().error();
    let [selector, banner, panels, quick] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(if error.is_some() { 3 } else { 0 }),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(widgets::model_selector(app.models_query(), page.selected_model())),
        selector,
    );
    if let Some(error) = error {
        f.render_widget(
            widgets::error_card("Unable to Load data for Fire Areas", error),
            banner,
        );
    }

    let [map_area, table_area] =
        Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)]).areas(panels);
    let items = page.items();

    let map_block = super::panel("Risk Map");
    if page.is_loading() {
        f.render_widget(widgets::message("Loading map...").block(map_block), map_area);
    } else if page.show_empty_state() {
        f.render_widget(widgets::message(MAP_EMPTY_MESSAGE).block(map_block), map_area);
    } else {
        risk_map::render(
            f,
            map_area,
            map_block,
            page.map.bounds(),
            &markers(items, page.selected_row),
        );
    }

    let table_block = super::panel_with_note(
        "Top 5 Areas",
        &widgets::refresh_note(page.areas()),
    );
    if page.is_loading() {
        f.render_widget(
            widgets::message("Loading top areas...").block(table_block),
            table_area,
        );
    } else if page.show_empty_state() {
        f.render_widget(widgets::message(TABLE_EMPTY_MESSAGE).block(table_block), table_area);
    } else {
        let mut state = TableState::default().with_selected(Some(page.selected_row));
        f.render_stateful_widget(areas_table(items).block(table_block), table_area, &mut state);
    }

    if let Some(top) = items.first() {
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(" Quick view: ", Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("open highest-risk area details ({})", top.name),
                    Style::default().add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled("  [v]", Style::default().fg(Color::DarkGray)),
            ])),
            quick,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn item(name: &str, probability: f64) -> TopItem {
        TopItem {
            area_id: name.to_string(),
            name: name.to_string(),
            lat: 40.0,
            lon: -111.0,
            predicted_at: DateTime::from_timestamp(0, 0).unwrap(),
            probability,
            model_id: "rf".to_string(),
        }
    }

    #[test]
    fn riskiest_marker_is_drawn_last() {
        let markers = markers(&[item("A", 0.9), item("B", 0.1), item("C", 0.5)], 1);
        let radii: Vec<f64> = markers.iter().map(|m| m.radius_px).collect();
        assert_eq!(radii, [7.0 + 0.8, 7.0 + 4.0, 7.0 + 7.2]);
        assert_eq!(markers[0].label.as_deref(), Some(" B"));
        assert!(markers[2].label.is_none());
    }
}
