use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::widgets;
use crate::api::models::ModelInfo;
use crate::app::App;
use crate::pages::compare::{CompareRow, ComparePage, EMPTY_MESSAGE};

fn compare_table(models: &[ModelInfo], rows: &[CompareRow]) -> Table<'static> {
    let mut header = vec![Cell::from("Area"), Cell::from("Location")];
    header.extend(models.iter().map(|m| Cell::from(m.name.clone())));
    header.push(Cell::from("Latest (UTC)"));

    let body: Vec<Row> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![
                Cell::from(row.name.clone()),
                Cell::from(format!("{:.4}, {:.4}", row.lat, row.lon)),
            ];
            cells.extend(row.cells.iter().map(|cell| match cell {
                Some(probability) => Cell::from(Line::from(widgets::badge(*probability))),
                None => Cell::from(Line::from(widgets::placeholder())),
            }));
            cells.push(match &row.latest {
                Some(at) => Cell::from(at.format("%Y-%m-%d %H:%M").to_string()),
                None => Cell::from(Line::from(widgets::placeholder())),
            });
            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Min(14), Constraint::Length(20)];
    widths.extend(models.iter().map(|_| Constraint::Length(12)));
    widths.push(Constraint::Length(16));

    Table::new(body, widths)
        .header(Row::new(header).style(Style::default().fg(Color::Yellow)))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
}

pub fn render(f: &mut Frame, area: Rect, app: &App, page: &ComparePage) {
    let error = page.compare().error();
    let [heading, banner, body] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(if error.is_some() { 3 } else { 0 }),
        Constraint::Min(0),
    ])
    .areas(area);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(
                " Compare Models ",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Top 5 at-risk areas per model, compared across all model probabilities.",
                Style::default().fg(Color::DarkGray),
            ),
        ])),
        heading,
    );
    if let Some(error) = error {
        f.render_widget(
            widgets::error_card("Unable to Load Comparison Data", error),
            banner,
        );
    }

    let block = super::panel_with_note(
        "Cross-Model Risk Table",
        &widgets::refresh_note(page.compare()),
    );
    if page.compare().is_loading() {
        f.render_widget(widgets::message("Loading comparison...").block(block), body);
    } else if page.show_empty_state() {
        f.render_widget(widgets::message(EMPTY_MESSAGE).block(block), body);
    } else {
        let models = page.columns(app.models());
        let rows = page.rows(app.models());
        let mut state = TableState::default().with_selected(Some(page.selected_row));
        f.render_stateful_widget(compare_table(models, &rows).block(block), body, &mut state);
    }
}
