use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use ed_core::period::PeriodSelection;

use crate::app::App;
use crate::panels;
use crate::widgets::{help_modal, status_bar};

/// Master render function: period selector, range, the two panels, status bar.
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // period selector
            Constraint::Length(1), // resolved range
            Constraint::Min(0),    // panels
            Constraint::Length(1), // status bar
        ])
        .split(frame.area());

    render_period_bar(frame, app, chunks[0]);
    render_range(frame, app, chunks[1]);
    render_section(frame, app, chunks[2]);
    status_bar::render(frame, app, chunks[3]);

    if app.show_help {
        help_modal::render(frame);
    }
}

fn render_period_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = PeriodSelection::ALL
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Line::from(vec![
                Span::styled(
                    format!("{}", i + 1),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(":"),
                Span::raw(p.label()),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" engagement-dashboard ")
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
        )
        .select(app.period().index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw(" | "));

    frame.render_widget(tabs, area);
}

fn render_range(frame: &mut Frame, app: &App, area: Rect) {
    let params = app.range.params();
    let line = Line::from(vec![
        Span::styled(" Range: ", Style::default().fg(Color::DarkGray)),
        Span::raw(params.start_iso()),
        Span::styled(" .. ", Style::default().fg(Color::DarkGray)),
        Span::raw(params.end_iso()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_section(frame: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let view = app.view();
    panels::origins::render(frame, &view, halves[0]);
    panels::top_channels::render(frame, &view, halves[1]);
}
