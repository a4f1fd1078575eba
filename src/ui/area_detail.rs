use std::fmt::Debug;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use super::widgets;
use crate::api::areas::{PredictionLatest, SatelliteLatest, WeatherLatest};
use crate::api::timestamp;
use crate::app::App;
use crate::pages::area_detail::AreaDetailPage;
use crate::query::Query;
use crate::units::{self, Units};

fn field(name: &str, value: String) -> Row<'static> {
    Row::new(vec![
        Cell::from(format!(" {name}")),
        Cell::from(value).style(Style::default().fg(Color::Green)),
    ])
}

fn weather_table(weather: &WeatherLatest, units: Units) -> Table<'static> {
    let rows = vec![
        Row::new(vec![Cell::from("")]),
        field("Temperature", units.temperature(weather.temperature_c)),
        field("Dewpoint", units.temperature(weather.dewpoint_c)),
        field("Heat Index", units.temperature(weather.heat_index_c)),
        field("Humidity", units::percent(weather.relative_humidity_pct)),
        field("Wind Speed", units.speed(weather.wind_speed_kph)),
        field("Wind Gust", units.speed(weather.wind_gust_kph)),
        field("Wind Dir", units::wind_direction(weather.wind_direction_deg)),
        field("Precipitation", units.precipitation(weather.precipitation_3h_mm)),
        field("Pressure", units.pressure(weather.barometric_pressure_pa)),
        field("Visibility", units.visibility(weather.visibility_m)),
        field("Observed At", timestamp::iso(&weather.observed_at)),
    ];
    Table::new(rows, [Constraint::Length(15), Constraint::Min(10)])
}

fn prediction_lines(prediction: &PredictionLatest) -> Vec<Line<'static>> {
    let mut probability = vec![Span::raw(" Probability  ")];
    probability.extend(widgets::badge_with_label(prediction.probability).spans);
    vec![
        Line::from(""),
        Line::from(probability),
        Line::from(vec![
            Span::raw(" Label        "),
            Span::styled(prediction.label_text(), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw(" Model        "),
            Span::styled(prediction.model_id.clone(), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::raw(" Predicted At "),
            Span::styled(
                timestamp::iso(&prediction.predicted_at),
                Style::default().fg(Color::Green),
            ),
        ]),
    ]
}

fn satellite_lines(satellite: &SatelliteLatest) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Image  "),
            Span::styled(
                satellite.satellite_url.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                " {} · {} · {}",
                satellite.filename,
                satellite.content_type,
                timestamp::iso(&satellite.captured_at)
            ),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            format!(" Stored at {}", satellite.file_path),
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

pub fn render(f: &mut Frame, area: Rect, app: &App, page: &AreaDetailPage) {
    let [heading, selector, cards, satellite_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(14),
        Constraint::Length(7),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                " Area Details ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("Area ID: {}", page.area_id())),
            Span::styled("   Esc back to dashboard", Style::default().fg(Color::DarkGray)),
        ])),
        heading,
    );
    f.render_widget(
        Paragraph::new(widgets::model_selector(app.models_query(), page.selected_model())),
        selector,
    );

    let [weather_area, prediction_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(cards);

    let units = app.config().units;
    card(
        f,
        weather_area,
        ("Latest Weather", "Refreshed every 10s"),
        page.weather(),
        ("Loading weather...", "No weather data available."),
        |f, area, data, block| f.render_widget(weather_table(data, units).block(block), area),
    );
    card(
        f,
        prediction_area,
        ("Latest Prediction", "Model-specific output"),
        page.prediction(),
        ("Loading prediction...", "No prediction data available."),
        |f, area, data, block| {
            f.render_widget(Paragraph::new(prediction_lines(data)).block(block), area)
        },
    );
    card(
        f,
        satellite_area,
        ("Latest Satellite Image", "Stored file served by API"),
        page.satellite(),
        ("Loading satellite image...", "No satellite image available."),
        |f, area, data, block| {
            f.render_widget(
                Paragraph::new(satellite_lines(data))
                    .wrap(Wrap { trim: false })
                    .block(block),
                area,
            )
        },
    );
}

/// One query-backed panel. A failure with nothing to show fills the panel
/// with the error; a failed refresh keeps the last value and names the
/// error in the panel note.
fn card<K: Clone + PartialEq + Debug, T>(
    f: &mut Frame,
    area: Rect,
    (title, note): (&str, &str),
    query: &Query<K, T>,
    (loading, empty): (&str, &str),
    draw: impl FnOnce(&mut Frame, Rect, &T, Block<'static>),
) {
    match (query.data(), query.error()) {
        (None, _) if query.is_loading() => f.render_widget(
            widgets::message(loading).block(super::panel_with_note(title, note)),
            area,
        ),
        (Some(data), None) => draw(f, area, data, super::panel_with_note(title, note)),
        (Some(data), Some(err)) => {
            let block = super::panel_with_note(title, &format!("Refresh failed: {err}"));
            draw(f, area, data, block)
        }
        (None, Some(err)) => f.render_widget(
            widgets::error_card(&format!("Unable to Load {title}"), err)
                .block(super::panel_with_note(title, note)),
            area,
        ),
        (None, None) => f.render_widget(
            widgets::message(empty).block(super::panel_with_note(title, note)),
            area,
        ),
    }
}
