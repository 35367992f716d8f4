//! Command handlers invoked by the renderer.
//!
//! Each sub-module groups related commands by domain. Handlers take the
//! [`SharedState`], return camelCase DTOs and report failures as
//! user-facing strings.

pub mod favorites;
pub mod identity;
pub mod products;
pub mod reviews;
pub mod share;

use std::sync::MutexGuard;

use diecast_shared::error::MarketError;

use crate::state::{AppState, SharedState};

pub(crate) fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>, String> {
    state.lock().map_err(|e| format!("Lock poisoned: {e}"))
}

/// Message shown to the user for a failed operation.
pub(crate) fn user_message(err: MarketError) -> String {
    if err == MarketError::StorageUnavailable {
        tracing::warn!("store rejected a write, session state kept");
    }
    err.to_string()
}

#[cfg(test)]
pub(crate) fn test_state() -> SharedState {
    use std::sync::{Arc, Mutex};

    use diecast_store::KvStore;

    use crate::config::ClientConfig;

    Arc::new(Mutex::new(AppState::with_store(
        KvStore::in_memory(),
        ClientConfig::default(),
    )))
}
