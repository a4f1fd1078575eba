use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::route::Route;

fn tab(label: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!(" {label} "), style)
}

/// Title, page tabs and the address bar. On the legacy dashboard only the
/// title is shown.
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = Span::styled(
        "Rincon Fire",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let Some(location) = app.location() else {
        let lines = vec![
            Line::from(vec![Span::raw(" "), title, Span::raw("  legacy station dashboard")]),
            Line::from(""),
        ];
        f.render_widget(Paragraph::new(lines).block(super::panel("Stations")), area);
        return;
    };

    let tabs = Line::from(vec![
        Span::raw(" "),
        title,
        Span::raw("   "),
        tab("1 Dashboard", location.route == Route::Dashboard),
        Span::raw(" "),
        tab("2 Compare", location.route == Route::Compare),
    ]);

    let address = match app.prompt() {
        Some(input) => Line::from(vec![
            Span::styled(" : ", Style::default().fg(Color::Yellow)),
            Span::raw(input.to_string()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]),
        None => Line::from(vec![
            Span::raw(" "),
            Span::styled(location.to_string(), Style::default().fg(Color::Blue)),
        ]),
    };

    f.render_widget(
        Paragraph::new(vec![tabs, address]).block(super::panel("Navigation")),
        area,
    );
}
