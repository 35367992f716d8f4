pub mod commands;
pub mod config;
pub mod projection;
pub mod state;

use std::sync::{Arc, Mutex};

use diecast_store::StoreError;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ClientConfig;
use crate::state::{AppState, SharedState};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Calling it again is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("diecast_client=debug,diecast_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Open the session described by `config` and return the state handle that
/// every command takes.
pub fn start(config: ClientConfig) -> Result<SharedState, StoreError> {
    tracing::info!(
        app = diecast_shared::constants::APP_NAME,
        in_memory = config.in_memory,
        "Starting client session"
    );
    let state = AppState::open(config)?;
    Ok(Arc::new(Mutex::new(state)))
}
