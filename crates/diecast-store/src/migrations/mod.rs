//! Schema upgrades for the SQLite backend.
//!
//! Each step is listed in [`STEPS`] with the `user_version` it brings the file
//! to. Opening a database applies every step above the stored version, each
//! inside its own transaction together with the version bump.

pub mod v001_initial;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

const STEPS: &[(u32, &str, Step)] = &[(1, "v001_initial", v001_initial::up)];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Bring the schema of `conn` up to [`latest_version`].
///
/// A file already past that version was written by a newer build; it is left
/// as is, since the `kv` table layout is shared by every version so far.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let stored: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();

    if stored > latest {
        tracing::warn!(stored, latest, "database schema is newer than this build");
        return Ok(());
    }

    for (version, name, step) in STEPS.iter().filter(|(v, _, _)| *v > stored) {
        tracing::info!(version, name, "upgrading kv schema");
        let tx = conn.unchecked_transaction()?;
        step(&tx).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
    }

    Ok(())
}
