use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph};

use ed_api_types::RoomType;
use ed_core::shaper::{origin_label, origin_color, type_glyph};

use crate::panels::slice_color;

/// Keys column, then what they do.
const BINDINGS: &[(&str, &str)] = &[
    ("1  2  3", "Last 7 / 30 / 90 days"),
    ("\u{2192}  l  Tab", "Next period"),
    ("\u{2190}  h  Shift-Tab", "Previous period"),
    ("r", "Refresh now"),
    ("?  Esc", "Close this help"),
    ("q  Ctrl-c", "Quit"),
];

const KEY_COLUMN: usize = 18;

/// Key reference popup, sized to its content and centred.
pub fn render(frame: &mut Frame) {
    let mut lines: Vec<Line> = BINDINGS
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", keys, width = KEY_COLUMN),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ),
                Span::raw(*action),
            ])
        })
        .collect();
    lines.push(Line::default());
    lines.push(glyph_legend());

    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16 + 3;
    let height = lines.len() as u16 + 2;
    let area = popup_area(frame.area(), width, height);

    let block = Block::bordered()
        .title(" Help ")
        .title_bottom(Line::from(" ? / Esc ").right_aligned())
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// What the type glyphs in the channel table stand for.
fn glyph_legend() -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for room_type in RoomType::ORIGINS.into_iter().chain([RoomType::Unknown]) {
        spans.push(Span::styled(
            type_glyph(room_type),
            Style::default().fg(slice_color(origin_color(room_type))),
        ));
        spans.push(Span::styled(
            format!(" {}   ", origin_label(room_type)),
            Style::default().fg(Color::Gray),
        ));
    }
    Line::from(spans)
}

fn popup_area(outer: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(outer);
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    area
}
