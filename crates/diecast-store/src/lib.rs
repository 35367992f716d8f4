//! # diecast-store
//!
//! Client-local persistence for the Diecast marketplace.
//!
//! Everything is kept in a small key-value store: a SQLite file on disk, or an
//! in-memory map for tests and throwaway sessions. [`KvStore`] is the only
//! thing that talks to a backend and never fails loudly; the repositories on
//! top of it (identity, catalog, photos, reviews, favorites) own the JSON
//! schemas and the business rules.

pub mod catalog;
pub mod codec;
pub mod database;
pub mod favorites;
pub mod identity;
pub mod kv;
pub mod memory;
pub mod migrations;
pub mod models;
pub mod photos;
pub mod reviews;

mod error;

pub use catalog::{Catalog, ListFilter, SearchOutcome};
pub use database::Database;
pub use error::{DecodeError, StoreError};
pub use favorites::Favorites;
pub use identity::IdentityManager;
pub use kv::{KvBackend, KvStore, WriteStatus};
pub use memory::MemoryBackend;
pub use models::*;
pub use photos::PhotoStore;
pub use reviews::{ReviewLedger, SellerStats};
