use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, View};
use crate::pages::Page;

mod area_detail;
mod compare;
mod dashboard;
mod legacy;
mod nav;
mod risk_map;
mod widgets;

const HELP_ROUTED: &str =
    " q quit  1/2 pages  m/M model  ↑/↓ select  Enter open  v quick view  : address  r refresh  Esc back";
const HELP_LEGACY: &str = " q quit  p get predictions  s get satellite image  l load stations  ↑/↓ select";

pub fn draw(f: &mut Frame, app: &App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    nav::render(f, header, app);
    match app.view() {
        View::Routed(page) => {
            match page {
                Page::Dashboard(page) => dashboard::render(f, body, app, page),
                Page::Compare(page) => compare::render(f, body, app, page),
                Page::AreaDetail(page) => area_detail::render(f, body, app, page),
                Page::NotFound(path) => render_not_found(f, body, path),
            }
            f.render_widget(help(HELP_ROUTED), footer);
        }
        View::Legacy(page) => {
            legacy::render(f, body, page);
            f.render_widget(help(HELP_LEGACY), footer);
        }
    }
}

/// Rounded cyan frame with a yellow title, used by every panel.
fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

/// Panel with a right-aligned note such as "Refreshing...".
fn panel_with_note(title: &str, note: &str) -> Block<'static> {
    panel(title).title_top(
        Line::from(Span::styled(
            format!(" {note} "),
            Style::default().fg(Color::DarkGray),
        ))
        .right_aligned(),
    )
}

fn help(text: &'static str) -> Paragraph<'static> {
    Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
}

fn render_not_found(f: &mut Frame, area: Rect, path: &str) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "404",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from("The page you requested was not found."),
        Line::from(Span::styled(path.to_string(), Style::default().fg(Color::Blue))),
        Line::from(""),
        Line::from("Press Esc to return to the dashboard."),
    ];
    f.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(panel("Not Found")),
        area,
    );
}
