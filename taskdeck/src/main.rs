//! `TaskDeck` — terminal-native multi-user to-do client.
//!
//! Launches the TUI and talks to a task backend over JSON-over-HTTP.
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # Offline demo mode (no server required)
//! cargo run --bin taskdeck
//!
//! # Connect to a backend
//! cargo run --bin taskdeck -- --api-url http://127.0.0.1:8000
//!
//! # Or via environment variables
//! TASKDECK_API_URL=http://127.0.0.1:8000 cargo run --bin taskdeck
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;
use url::Url;

use taskdeck::app::App;
use taskdeck::backend::{LocalBackend, RestBackend};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::session::Session;
use taskdeck::store::TaskStore;
use taskdeck::ui;
use taskdeck::worker::{self, UiCommand, UiEvent};

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("taskdeck starting");

    // Session: explicit token file > platform default > in-memory.
    let session = config.token_file.clone().map_or_else(
        || Session::default_store_path().map_or_else(Session::ephemeral, Session::new),
        Session::new,
    );

    // Spawn the worker over the REST backend, or the in-process demo
    // backend when no server is configured.
    let (offline, cmd_tx, evt_rx) = match config.api_url.as_deref() {
        Some(raw_url) => match Url::parse(raw_url) {
            Ok(base) => {
                tracing::info!(api_url = raw_url, "using REST backend");
                let backend = RestBackend::new(base, session.clone());
                let store = TaskStore::new(backend, config.page_size);
                let (tx, rx) = worker::spawn(store, session.clone());
                (false, tx, rx)
            }
            Err(e) => {
                eprintln!("Invalid API URL {raw_url}: {e}");
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("no API URL configured, running offline demo mode");
            let store = TaskStore::new(LocalBackend::with_demo_tasks(), config.page_size);
            let (tx, rx) = worker::spawn(store, session.clone());
            (true, tx, rx)
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &config, &session, offline, cmd_tx, evt_rx).await;

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("taskdeck exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the
/// terminal). Returns a [`WorkerGuard`] that must be held until shutdown to
/// ensure all buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop: draw, drain worker events, poll keys.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &ClientConfig,
    session: &Session,
    offline: bool,
    cmd_tx: mpsc::Sender<UiCommand>,
    mut evt_rx: mpsc::Receiver<UiEvent>,
) -> io::Result<()> {
    let mut app = App::new()
        .with_date_format(&config.date_format)
        .with_offline(offline);

    // A restored token (or demo mode, which has no real auth) skips the
    // login screen; the first page load is dispatched immediately.
    if offline || session.is_authenticated() {
        app.restore_session();
        dispatch(
            &mut app,
            &cmd_tx,
            UiCommand::Load {
                page: 1,
                filter: None,
            },
        );
    }

    loop {
        // Step 1: Draw the UI frame.
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending worker events (non-blocking).
        while let Ok(worker_event) = evt_rx.try_recv() {
            if let Some(follow_up) = app.apply_event(worker_event) {
                dispatch(&mut app, &cmd_tx, follow_up);
            }
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(command) = app.handle_key_event(key) {
                dispatch(&mut app, &cmd_tx, command);
            }
        }

        if app.should_quit {
            // Ask the worker to stop; it may already be gone.
            let _ = cmd_tx.try_send(UiCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hand a command to the worker, surfacing channel problems in the status
/// line instead of wedging the `busy` flag.
fn dispatch(app: &mut App, cmd_tx: &mpsc::Sender<UiCommand>, command: UiCommand) {
    match cmd_tx.try_send(command) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            app.busy = false;
            app.status_message = Some("Worker busy — try again".to_string());
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            app.busy = false;
            app.status_message = Some("Worker stopped — restart taskdeck".to_string());
        }
    }
}
