//! TrainTrack - a terminal attendance tracker for training studios.
//!
//! Runs the interactive TUI by default. `--dump` prints the loaded data as
//! JSON and `--check-in <id>` checks one athlete in without opening the UI.

mod app;
mod form;
mod ui;
mod utils;

use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use serde::Serialize;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use traintrack_core::models::{AttendanceStats, Athlete, Group, Schedule};
use traintrack_core::{ApiClient, AttendanceStore, Config};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Prefix of the daily log files written while the TUI owns the terminal
const LOG_FILE_PREFIX: &str = "traintrack";

const USAGE: &str = "Usage: traintrack [--dump | --check-in <athlete-id>]";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Tui,
    Dump,
    CheckIn(i64),
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [] => Ok(Command::Tui),
        [flag] if flag == "--dump" => Ok(Command::Dump),
        [flag, id] if flag == "--check-in" => {
            let id = id
                .parse()
                .with_context(|| format!("Invalid athlete id: {}", id))?;
            Ok(Command::CheckIn(id))
        }
        _ => bail!(USAGE),
    }
}

fn env_filter() -> EnvFilter {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to stderr for the one-shot commands.
fn init_stderr_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

/// Log to a daily file, since the TUI owns stdout and stderr.
///
/// The returned guard flushes the writer on drop and must outlive the UI.
fn init_file_tracing(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)
        .context("Failed to open log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();
    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    match command {
        Command::Dump => {
            init_stderr_tracing();
            warn_config_error(config_error);
            return dump(config).await;
        }
        Command::CheckIn(id) => {
            init_stderr_tracing();
            warn_config_error(config_error);
            return check_in(config, id).await;
        }
        Command::Tui => {}
    }

    let _log_guard = match config.log_dir().and_then(|dir| init_file_tracing(&dir)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {:#}", e);
            None
        }
    };
    warn_config_error(config_error);
    info!("TrainTrack starting");

    // Fail before touching the terminal so the message stays readable
    let mut app = App::new(config)?;

    // Show cached data while the first live load runs
    app.load_from_cache();
    app.refresh_background();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("TrainTrack shutting down");
    Ok(())
}

fn warn_config_error(error: Option<anyhow::Error>) {
    if let Some(e) = error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C always quits
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        app.check_background_tasks();

        if app.state == AppState::Quitting {
            return Ok(());
        }
    }
}

/// Build a store for the one-shot commands and load it from the API.
async fn open_store(config: &Config) -> Result<AttendanceStore<ApiClient>> {
    let api = ApiClient::new(&config.api_url()?, config.timeout())?;
    let mut store = AttendanceStore::new(api, config.today_label.clone());
    store.load().await.context("Failed to load data")?;
    Ok(store)
}

#[derive(Serialize)]
struct Dump<'a> {
    athletes: &'a [Athlete],
    groups: &'a [Group],
    schedules: &'a [Schedule],
    stats: AttendanceStats,
}

/// Print everything the API returns, as the store sees it.
async fn dump(config: Config) -> Result<()> {
    let store = open_store(&config).await?;

    let dump = Dump {
        athletes: store.athletes(),
        groups: store.groups(),
        schedules: store.schedules(),
        stats: store.stats(),
    };
    println!("{}", serde_json::to_string_pretty(&dump)?);
    Ok(())
}

async fn check_in(config: Config, athlete_id: i64) -> Result<()> {
    let mut store = open_store(&config).await?;

    let checked = store
        .check_in(athlete_id)
        .await
        .with_context(|| format!("Check-in for athlete {} failed", athlete_id))?;

    if let Some(athlete) = store.athlete(athlete_id) {
        let verb = if checked { "checked in" } else { "check-in cleared" };
        println!(
            "{} {} (last visit: {})",
            athlete.name, verb, athlete.last_visit
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args(&args(&[])).unwrap(), Command::Tui);
        assert_eq!(parse_args(&args(&["--dump"])).unwrap(), Command::Dump);
        assert_eq!(
            parse_args(&args(&["--check-in", "4"])).unwrap(),
            Command::CheckIn(4)
        );
    }

    #[test]
    fn test_parse_args_rejects_bad_input() {
        assert!(parse_args(&args(&["--check-in"])).is_err());
        assert!(parse_args(&args(&["--check-in", "four"])).is_err());

        let err = parse_args(&args(&["--verbose"])).unwrap_err();
        assert!(err.to_string().contains("Usage"));
    }
}
