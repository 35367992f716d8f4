use thiserror::Error;

/// Errors produced by a store backend.
///
/// These never reach repository callers: [`crate::KvStore`] turns them into
/// absent reads and dropped writes.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would grow the store past its capacity.
    #[error("Store quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// The backend lock was poisoned by a panicking writer.
    #[error("Store backend unavailable")]
    Poisoned,

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Why a persisted value could not be turned back into a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no value stored under {key}")]
    Absent { key: String },

    /// Not parseable at all (truncated write, foreign data).
    #[error("malformed value under {key}: {reason}")]
    Malformed { key: String, reason: String },

    /// Valid JSON, but not the expected schema.
    #[error("unexpected shape under {key}: {reason}")]
    WrongShape { key: String, reason: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
