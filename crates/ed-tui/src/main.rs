mod api_client;
mod app;
mod command;
mod panels;
mod ui;
mod widgets;
mod worker;

use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use crossterm::{
    event::{self as ct_event, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ed_core::config::Config;
use ed_core::period::PeriodSelection;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::api_client::ApiClient;
use crate::app::App;
use crate::command::AppCommand;
use crate::worker::FetchWorker;

struct Args {
    offline: bool,
    headless: bool,
    json_logs: bool,
    api: Option<String>,
    config: Option<PathBuf>,
    period: Option<PeriodSelection>,
}

fn parse_args() -> Result<Args> {
    // Simple flag parsing, no clap dependency.
    let args: Vec<String> = std::env::args().collect();
    let value_of = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let period = match value_of("--period") {
        Some(raw) => Some(raw.parse::<PeriodSelection>()?),
        None => None,
    };

    Ok(Args {
        offline: args.iter().any(|a| a == "--offline"),
        headless: args.iter().any(|a| a == "--headless"),
        json_logs: args.iter().any(|a| a == "--json-logs"),
        api: value_of("--api"),
        config: value_of("--config").map(PathBuf::from),
        period,
    })
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;
    let period = args.period.unwrap_or_else(|| config.dashboard.period());

    if args.headless {
        ed_telemetry::logging::init(
            "ed-tui",
            &config.logging.level,
            args.json_logs || config.logging.json,
        );
        return run_headless(&args, &config, period);
    }

    // The alternate screen owns the terminal; logs go to a file.
    let log_path = log_file_path();
    if let Err(e) =
        ed_telemetry::logging::init_logging_to_file("ed-tui", &config.logging.level, &log_path)
    {
        eprintln!("warning: cannot open log file {}: {e}", log_path.display());
    }

    // Set up panic hook to restore terminal on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let result = run(&args, &config, period);

    restore_terminal()?;
    result
}

fn log_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".engagement-dashboard")
        .join("ed-tui.log")
}

/// Start the fetch worker unless running on demo data.
fn spawn_worker(args: &Args, config: &Config, app: &App) -> Option<FetchWorker> {
    if args.offline {
        return None;
    }
    let client = ApiClient::from_config(&config.api, args.api.as_deref());
    Some(FetchWorker::spawn(
        client,
        app.section.ticket(),
        Duration::from_secs(config.api.refresh_interval_secs),
    ))
}

/// Queued ticket out, results in. No-op without a worker.
fn pump(app: &mut App, worker: Option<&FetchWorker>) -> usize {
    worker.map_or(0, |w| w.pump(app))
}

/// Run the interactive TUI with the standard crossterm backend.
fn run(args: &Args, config: &Config, period: PeriodSelection) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(args.offline, period);
    let worker = spawn_worker(args, config, &app);

    loop {
        pump(&mut app, worker.as_ref());

        terminal.draw(|frame| {
            ui::render(frame, &app);
        })?;

        if ct_event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = ct_event::read()? {
                app.on_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Headless mode: reads commands from stdin, outputs JSON events to stdout.
/// No terminal rendering.
///
/// Usage: `echo '{"cmd":"query_state"}' | ed-tui --headless`
fn run_headless(args: &Args, config: &Config, period: PeriodSelection) -> Result<()> {
    let mut app = App::new(args.offline, period);
    let worker = spawn_worker(args, config, &app);
    let sync_timeout = Duration::from_secs(config.api.timeout_secs.saturating_mul(2).max(1));

    emit_event(&serde_json::json!({
        "event": "started",
        "period": app.period(),
        "offline": app.offline,
    }));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }

        let applied = pump(&mut app, worker.as_ref());
        emit_refreshes(&app, applied);

        // Try JSON command first, then text command
        let cmd = command::parse_json_command(&line).or_else(|| command::parse_command(&line));

        match cmd {
            Some(AppCommand::Sync) => {
                let synced = match worker.as_ref() {
                    Some(worker) => {
                        worker.wait_for_data(&mut app, sync_timeout, |app| emit_refreshes(app, 1))
                    }
                    // Offline mode always has data.
                    None => true,
                };
                let event = if synced {
                    "synced"
                } else {
                    "sync_timeout"
                };
                emit_event(&serde_json::json!({
                    "event": event,
                    "state": app.view().state_name(),
                    "generation": app.section.generation().get(),
                }));
            }
            Some(cmd) => {
                let prev_period = app.period();
                let result = command::execute_command(&mut app, cmd);

                if app.period() != prev_period {
                    emit_event(&serde_json::json!({
                        "event": "period_changed",
                        "period": app.period(),
                        "label": app.period().label(),
                        "generation": app.section.generation().get(),
                    }));
                }

                if let Some(json_str) = result {
                    // Already JSON, print directly
                    println!("{}", json_str);
                    let _ = io::stdout().flush();
                } else {
                    emit_event(&serde_json::json!({"event": "ok"}));
                }
            }
            None => {
                emit_event(&serde_json::json!({
                    "event": "error",
                    "message": format!("unknown command: {}", line),
                }));
            }
        }

        if app.should_quit {
            emit_event(&serde_json::json!({"event": "quit"}));
            break;
        }

        // Forward any ticket the command queued.
        let applied = pump(&mut app, worker.as_ref());
        emit_refreshes(&app, applied);
    }

    Ok(())
}

fn emit_refreshes(app: &App, applied: usize) {
    if applied == 0 {
        return;
    }
    emit_event(&serde_json::json!({
        "event": "data_refreshed",
        "period": app.period(),
        "state": app.view().state_name(),
        "error": app.last_error,
    }));
}

fn emit_event(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string(value) {
        println!("{}", s);
        let _ = io::stdout().flush();
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;
    Ok(())
}
