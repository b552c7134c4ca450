//! `TaskDeck` backend stub -- in-memory implementation of the task API.
//!
//! An axum server that serves the `TaskDeck` REST contract from memory, for
//! integration tests and local development. Nothing is persisted; restart
//! and the world is empty again.
//!
//! # Usage
//!
//! ```bash
//! # Run on the default address 127.0.0.1:8000
//! cargo run --bin taskdeck-stub
//!
//! # Run on a custom address
//! cargo run --bin taskdeck-stub -- --bind 127.0.0.1:9000
//!
//! # Or via environment variable
//! TASKDECK_STUB_ADDR=127.0.0.1:9000 cargo run --bin taskdeck-stub
//! ```

use std::sync::Arc;

use clap::Parser;
use taskdeck_stub::config::{StubCliArgs, StubConfig};
use taskdeck_stub::server::{self, StubState};

#[tokio::main]
async fn main() {
    let cli = StubCliArgs::parse();

    // Load config from CLI args + config file + env vars + defaults.
    let config = match StubConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    // Initialize tracing with the resolved log level.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(addr = %config.bind_addr, "starting taskdeck stub server");

    let state = Arc::new(StubState::new());

    match server::start_server_with_state(&config.bind_addr, state).await {
        Ok((bound_addr, handle)) => {
            tracing::info!(addr = %bound_addr, "stub server listening");
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "stub server task failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to start stub server");
            std::process::exit(1);
        }
    }
}
