use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Map, MapResolution},
        Block,
    },
    Frame,
};

use crate::geo::{Bounds, MAP_SIZE_PX};

#[derive(Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub lat: f64,
    pub lon: f64,
    pub radius_px: f64,
    pub color: Color,
    /// Printed next to the marker when set.
    pub label: Option<String>,
}

/// Coastlines plus one circle per marker, drawn in the given order so
/// later markers sit on top.
pub fn render(f: &mut Frame, area: Rect, block: Block<'_>, bounds: Bounds, markers: &[MapMarker]) {
    let (_, lon_per_px) = bounds.degrees_per_px(MAP_SIZE_PX);
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            ctx.draw(&Map {
                resolution: MapResolution::High,
                color: Color::DarkGray,
            });
            ctx.layer();
            for marker in markers {
                ctx.draw(&Circle {
                    x: marker.lon,
                    y: marker.lat,
                    radius: marker.radius_px * lon_per_px,
                    color: marker.color,
                });
            }
            for marker in markers.iter().filter(|m| bounds.contains(m.lat, m.lon)) {
                if let Some(label) = &marker.label {
                    ctx.print(
                        marker.lon,
                        marker.lat,
                        Line::from(Span::styled(label.clone(), Style::default().fg(marker.color))),
                    );
                }
            }
        });
    f.render_widget(canvas, area);
}
