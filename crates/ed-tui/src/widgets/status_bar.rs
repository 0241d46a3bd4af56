use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;

/// Render the bottom status bar: key hints on the left, fetch status on the right.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(key, Style::default().fg(Color::Yellow)),
            Span::raw(label),
        ]
    };

    // Errors take most of the bar; only retry and quit hints remain.
    let left: Vec<Span> = if app.last_error.is_some() {
        [hint("[r]", " Retry  "), hint("[q]", " Quit")].concat()
    } else {
        [
            hint("[1-3]", " Period  "),
            hint("[\u{2190}/\u{2192}]", " Cycle  "),
            hint("[r]", " Refresh  "),
            hint("[?]", " Help  "),
            hint("[q]", " Quit"),
        ]
        .concat()
    };

    let (right_text, right_style) = match (&app.last_error, app.last_updated) {
        (Some(err), _) => (format!("error: {err}"), Style::default().fg(Color::LightRed)),
        (None, Some(at)) => (
            format!("updated {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::Gray),
        ),
        (None, None) => ("waiting for data".to_string(), Style::default().fg(Color::Gray)),
    };
    let right_text = if app.offline {
        format!("offline  {right_text}")
    } else {
        right_text
    };

    // Ratatui doesn't natively support split alignment in a single Paragraph,
    // so we pad the middle.
    let left_len: usize = left.iter().map(|s| s.content.chars().count()).sum();
    let right_len = right_text.chars().count();
    let total_width = area.width as usize;
    let padding = if total_width > left_len + right_len {
        total_width - left_len - right_len
    } else {
        1
    };

    let mut spans = left;
    spans.push(Span::raw(" ".repeat(padding)));
    spans.push(Span::styled(right_text, right_style));

    let bar = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(bar, area);
}
