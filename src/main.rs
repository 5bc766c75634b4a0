//! roster-admin binary entry point.
//!
//! Resolves configuration, starts logging and the async runtime, then runs
//! the TUI in raw mode and restores the terminal state on exit.
//!
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

use roster_admin::api::HttpAdminApi;
use roster_admin::app::{self, AppState, Dispatcher};
use roster_admin::config::{Cli, ConsoleConfig, LOG_FILE, config_dir};
use roster_admin::error::{Context, Result};

/// Send `tracing` output to a file; the terminal belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_ctx(|| format!("create {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_ctx(|| format!("open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Leave raw mode and the alternate screen before the default panic report.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        disable_raw_mode().ok();
        execute!(std::io::stdout(), LeaveAlternateScreen).ok();
        tracing::error!(%info, "console panicked");
        default_hook(info);
    }));
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConsoleConfig::resolve(&cli)?;
    let log_path = cli.log_file.clone().unwrap_or_else(|| config_dir().join(LOG_FILE));
    init_logging(&log_path)?;
    tracing::info!(base_url = %config.base_url, "starting console");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .with_ctx(|| "start async runtime".to_string())?;
    let api = HttpAdminApi::new(config.base_url.clone(), config.timeout, config.credentials())?;
    let (dispatcher, mut events) = Dispatcher::new(Arc::new(api), runtime.handle().clone());

    install_panic_hook();
    let mut terminal = init_terminal().map_err(|e| format!("init terminal: {}", e))?;
    let mut state = AppState::from_config_files();

    let res = app::run(&mut terminal, &mut state, &dispatcher, &mut events);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "console exited with an error");
        eprintln!("application error: {err}");
    }
    runtime.shutdown_background();
    Ok(())
}
