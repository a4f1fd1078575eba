use std::fmt::Debug;

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::api::models::{ModelInfo, ModelsResponse};
use crate::query::Query;
use crate::risk::{format_probability, probability_color, probability_label};
use crate::units::MISSING;

/// Probability on a tier-colored background, e.g. ` 82.3% `.
pub fn badge(probability: f64) -> Span<'static> {
    Span::styled(
        format!(" {} ", format_probability(probability)),
        Style::default()
            .fg(Color::White)
            .bg(probability_color(probability))
            .add_modifier(Modifier::BOLD),
    )
}

/// Badge followed by the tier name.
pub fn badge_with_label(probability: f64) -> Line<'static> {
    Line::from(vec![
        badge(probability),
        Span::raw(" "),
        Span::styled(
            probability_label(probability),
            Style::default().fg(probability_color(probability)),
        ),
    ])
}

pub fn placeholder() -> Span<'static> {
    Span::styled(MISSING, Style::default().fg(Color::DarkGray))
}

pub fn model_selector(models: &Query<(), ModelsResponse>, selected: Option<&str>) -> Line<'static> {
    let mut spans = vec![Span::styled(" Model ", Style::default().fg(Color::Yellow))];
    let listed: &[ModelInfo] = models
        .data()
        .map(|m| m.models.as_slice())
        .unwrap_or(&[]);
    if listed.is_empty() {
        let note = if models.is_loading() {
            "loading models...".to_string()
        } else if let Some(err) = models.error() {
            format!("models unavailable: {err}")
        } else {
            "no models".to_string()
        };
        spans.push(Span::styled(note, Style::default().fg(Color::DarkGray)));
        return Line::from(spans);
    }
    for model in listed {
        let style = if selected == Some(model.model_id.as_str()) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", model.name), style));
    }
    spans.push(Span::styled("  (m/M)", Style::default().fg(Color::DarkGray)));
    if let Some(model) = listed
        .iter()
        .find(|m| selected == Some(m.model_id.as_str()) && !m.description.is_empty())
    {
        spans.push(Span::styled(
            format!("  {}", model.description),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

/// Loading or empty-state text inside a panel.
pub fn message(text: &str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" {text}"),
            Style::default().fg(Color::Gray),
        )),
    ])
    .wrap(Wrap { trim: false })
}

/// Red card shown above the panels while a query is in error.
pub fn error_card(title: &str, error: &str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {title}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!(" {error}"), Style::default().fg(Color::Red))),
    ])
    .wrap(Wrap { trim: false })
}

/// "Refreshing..." while in flight, else when the shown sample was fetched.
pub fn refresh_note<K: Clone + PartialEq + Debug, T>(query: &Query<K, T>) -> String {
    if query.is_placeholder() {
        "Refreshing... (previous selection)".to_string()
    } else if query.is_fetching() {
        "Refreshing...".to_string()
    } else {
        match query.fetched_at() {
            Some(at) => format!("Latest sample {}", at.format("%H:%M:%S")),
            None => "Latest sample".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn badge_carries_tier_color() {
        let span = badge(0.823);
        assert_eq!(span.content, " 82.3% ");
        assert_eq!(span.style.bg, Some(Color::Rgb(0xb9, 0x1c, 0x1c)));
    }

    #[test]
    fn selector_marks_the_selected_model() {
        let mut models: Query<(), ModelsResponse> = Query::new();
        assert_eq!(model_selector(&models, None).spans[1].content, "no models");

        let epoch = models.request(());
        models.settle(
            epoch,
            Ok(ModelsResponse {
                models: vec![crate::fetch::testing::model("rf"), crate::fetch::testing::model("xgb")],
            }),
            DateTime::from_timestamp(0, 0).unwrap(),
        );
        let line = model_selector(&models, Some("xgb"));
        let selected: Vec<_> = line
            .spans
            .iter()
            .filter(|s| s.style.bg == Some(Color::Green))
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(selected, [" XGB "]);
    }
}
