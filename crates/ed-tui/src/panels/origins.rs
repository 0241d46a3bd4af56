use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use ed_core::shaper::SectionView;

use crate::app::SECTION_TITLE;
use crate::panels::slice_color;
use crate::widgets::share_bar;

/// Left panel: one share bar per origin, then the total.
pub fn render(frame: &mut Frame, view: &SectionView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {SECTION_TITLE} "));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(origins) = view.origins() else {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  Loading...", Style::default().fg(Color::DarkGray))),
        ]);
        frame.render_widget(placeholder, inner);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // spacer
            Constraint::Length(1), // direct
            Constraint::Length(1), // private
            Constraint::Length(1), // public
            Constraint::Length(1), // spacer
            Constraint::Length(1), // total
            Constraint::Min(0),
        ])
        .split(inner);

    let total = origins.total();
    for (i, slice) in origins.slices().iter().enumerate() {
        share_bar::render_share_bar(
            frame,
            rows[1 + i],
            slice.label,
            slice.value,
            slice.percent_of(total),
            slice_color(slice.color),
        );
    }

    let total_line = Paragraph::new(Line::from(vec![
        Span::raw("   Total: "),
        Span::styled(
            format!("{total} messages"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(total_line, rows[5]);
}
