use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

/// Width the legend label is padded to so bars of different slices line up.
const LABEL_WIDTH: usize = 17;

/// Renders one slice of the origin breakdown as a legend symbol, label and
/// horizontal share bar.
///
/// Example output: ` ■ Public channels   [████████░░░░░░] 52% (735)`
///
/// The filled portion uses `color`; the empty portion is rendered in dark gray.
pub fn render_share_bar(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    count: u64,
    percent: f64,
    color: Color,
) {
    let percent = percent.clamp(0.0, 100.0);
    let pct_text = format!(" {:>3.0}% ({count})", percent);

    let label_display = format!(" {:<width$}", label, width = LABEL_WIDTH);
    // " ■" + label + " [" + "]" + pct_text
    let overhead = 2 + label_display.chars().count() + 2 + 1 + pct_text.chars().count();
    let bar_width = (area.width as usize).saturating_sub(overhead);

    if area.height == 0 {
        return;
    }

    let filled_count = ((bar_width as f64) * percent / 100.0).round() as usize;
    let empty_count = bar_width.saturating_sub(filled_count);

    let filled: String = "\u{2588}".repeat(filled_count); // █
    let empty: String = "\u{2591}".repeat(empty_count); // ░

    let line = Line::from(vec![
        Span::styled(" \u{25A0}", Style::default().fg(color)), // ■
        Span::styled(label_display, Style::default().fg(Color::White)),
        Span::raw(" ["),
        Span::styled(filled, Style::default().fg(color)),
        Span::styled(empty, Style::default().fg(Color::DarkGray)),
        Span::raw("]"),
        Span::styled(pct_text, Style::default().fg(Color::White)),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}
