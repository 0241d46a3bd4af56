//! Command system for headless mode.
//!
//! Makes the section scriptable via two interfaces:
//! - **Text commands**: `:` prefixed, e.g. `:period last30`, `:query state`.
//! - **JSON pipe**: `{"cmd":"period","args":["last30"]}` over stdin.
//!
//! Query commands return serialized state as JSON strings so that scripts
//! can inspect the section without direct struct access.

use ed_core::period::PeriodSelection;
use serde_json::json;

use crate::app::App;

/// Commands accepted on the headless pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // Selection
    Period(PeriodSelection),
    NextPeriod,
    PrevPeriod,

    // Data
    Refresh,
    /// Block until the current period has data (handled by the caller).
    Sync,

    // Queries
    QueryState,
    QueryPeriod,

    // System
    Quit,
    Help,
}

// ---------------------------------------------------------------------------
// Text command parser  (`:` prefixed)
// ---------------------------------------------------------------------------

/// Parse a `:` prefixed command string.
pub fn parse_command(input: &str) -> Option<AppCommand> {
    let input = input.trim();
    let input = input.strip_prefix(':')?;
    let mut parts = input.splitn(2, ' ');
    let verb = parts.next()?.trim();
    let arg = parts.next().map(|s| s.trim());

    match verb {
        "period" | "p" => Some(AppCommand::Period(arg?.parse().ok()?)),
        "next" | "right" | "l" => Some(AppCommand::NextPeriod),
        "prev" | "left" | "h" => Some(AppCommand::PrevPeriod),
        "refresh" | "r" => Some(AppCommand::Refresh),
        "sync" | "wait" => Some(AppCommand::Sync),
        "query" => match arg? {
            "state" => Some(AppCommand::QueryState),
            "period" => Some(AppCommand::QueryPeriod),
            _ => None,
        },
        "quit" | "q" => Some(AppCommand::Quit),
        "help" | "?" => Some(AppCommand::Help),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JSON command parser
// ---------------------------------------------------------------------------

/// Parse a JSON command: `{"cmd":"period","args":["last30"]}` or `{"cmd":"query_state"}`.
pub fn parse_json_command(json: &str) -> Option<AppCommand> {
    let v: serde_json::Value = serde_json::from_str(json).ok()?;
    let cmd = v.get("cmd")?.as_str()?;
    let args = v.get("args");

    let arg_str = |idx: usize| -> Option<&str> { args?.as_array()?.get(idx)?.as_str() };

    match cmd {
        "period" => Some(AppCommand::Period(arg_str(0)?.parse().ok()?)),
        "next_period" | "next" => Some(AppCommand::NextPeriod),
        "prev_period" | "prev" => Some(AppCommand::PrevPeriod),
        "refresh" => Some(AppCommand::Refresh),
        "sync" => Some(AppCommand::Sync),
        "query_state" => Some(AppCommand::QueryState),
        "query_period" => Some(AppCommand::QueryPeriod),
        "quit" => Some(AppCommand::Quit),
        "help" => Some(AppCommand::Help),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Command execution
// ---------------------------------------------------------------------------

/// Execute a command against the application state.
///
/// Returns `Some(json_string)` for query commands, `None` for everything else.
/// `Sync` is a no-op here; the headless loop waits for data itself.
pub fn execute_command(app: &mut App, cmd: AppCommand) -> Option<String> {
    match cmd {
        AppCommand::Period(period) => {
            app.select_period(period);
            None
        }
        AppCommand::NextPeriod => {
            app.select_period(app.period().next());
            None
        }
        AppCommand::PrevPeriod => {
            app.select_period(app.period().prev());
            None
        }
        AppCommand::Refresh => {
            app.request_refresh();
            None
        }
        AppCommand::Sync => None,
        AppCommand::QueryState => Some(query_state(app).to_string()),
        AppCommand::QueryPeriod => Some(query_period(app).to_string()),
        AppCommand::Quit => {
            app.should_quit = true;
            None
        }
        AppCommand::Help => {
            app.show_help = !app.show_help;
            None
        }
    }
}

fn query_period(app: &App) -> serde_json::Value {
    let period = app.period();
    let params = app.range.params();
    json!({
        "event": "period",
        "period": period,
        "label": period.label(),
        "days": period.days(),
        "generation": app.section.generation().get(),
        "start": params.start_iso(),
        "end": params.end_iso(),
    })
}

fn query_state(app: &App) -> serde_json::Value {
    let view = app.view();
    json!({
        "event": "state",
        "period": app.period(),
        "generation": app.section.generation().get(),
        "offline": app.offline,
        "state": view.state_name(),
        "view": view,
        "last_error": app.last_error,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
