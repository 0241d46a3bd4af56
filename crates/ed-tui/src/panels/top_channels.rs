use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use ed_api_types::RoomType;
use ed_core::shaper::{origin_color, type_glyph, SectionView};

use crate::panels::slice_color;

const RANK_WIDTH: u16 = 4;
const COUNT_WIDTH: u16 = 10;

/// Right panel: ranked table, "Not enough data" when empty.
pub fn render(frame: &mut Frame, view: &SectionView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Most popular channels (Top 5) ");

    let Some(channels) = view.channels() else {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Loading...", Style::default().fg(Color::DarkGray))),
        ])
        .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    if channels.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("Not enough data", Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Channel"),
        Cell::from(Line::from("Messages").alignment(Alignment::Right)),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    // borders + column spacing + glyph
    let name_width = (area.width.saturating_sub(RANK_WIDTH + COUNT_WIDTH + 2 + 2 + 2)) as usize;

    let rows: Vec<Row> = channels
        .iter()
        .map(|entry| {
            Row::new(vec![
                Cell::from(format!("{}.", entry.rank)),
                Cell::from(Line::from(vec![
                    Span::styled(
                        format!("{} ", type_glyph(entry.room_type)),
                        Style::default().fg(glyph_color(entry.room_type)),
                    ),
                    Span::raw(truncate_to_width(&entry.display_name, name_width)),
                ])),
                Cell::from(Line::from(entry.message_count.to_string()).alignment(Alignment::Right)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(RANK_WIDTH),
        Constraint::Min(10),
        Constraint::Length(COUNT_WIDTH),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn glyph_color(room_type: RoomType) -> Color {
    slice_color(origin_color(room_type))
}

/// Cut `text` to at most `max` terminal columns, marking the cut with `…`.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('\u{2026}');
    out
}
