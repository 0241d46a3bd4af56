pub mod origins;
pub mod top_channels;

use ratatui::style::Color;

/// Terminal colour for a `#RRGGBB` slice colour.
pub fn slice_color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::White)
}
