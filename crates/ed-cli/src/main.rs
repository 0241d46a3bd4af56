mod commands;

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use ed_core::config::{Config, CredentialProvider};
use ed_core::period::PeriodSelection;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// engagement-dashboard CLI -- one-shot reports of where messages are sent.
#[derive(Parser)]
#[command(name = "edash", version, about)]
struct Cli {
    /// Reporting server base URL (overrides `[api] base_url`).
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (default: ~/.engagement-dashboard/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON on stderr.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Origin breakdown and top channels (default when no subcommand is given).
    Messages {
        /// last7, last30 or last90.
        #[arg(short, long)]
        period: Option<PeriodSelection>,
        /// Print the shaped section as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the date range a period resolves to right now.
    Range {
        #[arg(short, long)]
        period: Option<PeriodSelection>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;

    ed_telemetry::logging::init(
        "edash",
        &config.logging.level,
        cli.json_logs || config.logging.json,
    );

    let default_period = config.dashboard.period();
    let endpoint = endpoint(&cli, &config);

    match cli.command {
        None => {
            commands::messages::run(&endpoint, default_period, false).await?;
        }
        Some(Commands::Messages { period, json }) => {
            commands::messages::run(&endpoint, period.unwrap_or(default_period), json).await?;
        }
        Some(Commands::Range { period }) => {
            commands::range::run(period.unwrap_or(default_period));
        }
    }

    Ok(())
}

fn endpoint(cli: &Cli, config: &Config) -> commands::Endpoint {
    commands::Endpoint {
        base_url: cli
            .api_url
            .clone()
            .unwrap_or_else(|| config.api.base_url.clone()),
        timeout: std::time::Duration::from_secs(config.api.timeout_secs),
        credentials: CredentialProvider::credentials(&config.api),
    }
}
