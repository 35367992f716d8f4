//! Session state shared across all commands.
//!
//! The [`AppState`] struct owns every repository for the running session. It
//! is wrapped in `Arc<Mutex<>>` ([`SharedState`]) so that command handlers on
//! any thread can reach it.

use std::sync::{Arc, Mutex};

use diecast_shared::identity::PlatformUser;
use diecast_shared::photo::PendingPhotos;
use diecast_shared::types::ProductId;
use diecast_store::{
    Catalog, Database, Favorites, IdentityManager, KvStore, MemoryBackend, PhotoStore,
    ReviewLedger, StoreError,
};

use crate::config::ClientConfig;

pub type SharedState = Arc<Mutex<AppState>>;

/// Central session state.
///
/// Built once per session from a [`KvStore`]; nothing in here is global.
pub struct AppState {
    pub config: ClientConfig,

    /// The session user. Always present: a fresh local identity is created
    /// when none is stored.
    pub identity: IdentityManager,

    /// Product listings, joined with their photos on read.
    pub catalog: Catalog,

    /// Per-slot photo blobs backing the catalog.
    pub photos: PhotoStore,

    pub reviews: ReviewLedger,

    pub favorites: Favorites,

    /// Photos attached to the listing currently being composed.
    /// Discarded by clearing; nothing is persisted until publish.
    pub pending_photos: PendingPhotos,

    /// Product requested by the link the session was opened with, waiting to
    /// be shown.
    pub shared_product: Option<ProductId>,
}

impl AppState {
    /// Open the configured store and load the session.
    pub fn open(config: ClientConfig) -> Result<Self, StoreError> {
        let store = if config.in_memory {
            let backend = MemoryBackend::new();
            backend.set_quota(config.store_quota);
            tracing::info!("using in-memory store");
            KvStore::new(backend)
        } else {
            let db = match config.data_dir {
                Some(ref dir) => Database::open_in(dir)?,
                None => Database::new()?,
            };
            tracing::info!(path = ?db.path(), "opened client store");
            KvStore::new(db.with_quota(config.store_quota))
        };
        Ok(Self::with_store(store, config))
    }

    /// Load every repository from `store` and tidy up leftovers of earlier
    /// sessions.
    pub fn with_store(store: KvStore, config: ClientConfig) -> Self {
        let photos = PhotoStore::new(store.clone());
        let mut state = Self {
            identity: IdentityManager::load_or_create(store.clone()),
            catalog: Catalog::load(store.clone(), photos.clone()),
            reviews: ReviewLedger::load(store.clone()),
            favorites: Favorites::load(store),
            photos,
            pending_photos: PendingPhotos::new(),
            shared_product: None,
            config,
        };
        state.housekeeping();
        state
    }

    /// Hand the session over to the identity supplied by the host platform.
    pub fn launch_with(&mut self, platform: &PlatformUser) -> diecast_shared::error::Result<()> {
        self.identity.adopt_platform_identity(platform)?;
        self.refresh_own_rating();
        Ok(())
    }

    /// Mirror the session user's seller rating from the review ledger.
    pub fn refresh_own_rating(&mut self) {
        let stats = self.reviews.seller_stats(&self.identity.current().id);
        if let Err(e) = self.identity.sync_stats(stats.rating, stats.review_count) {
            tracing::warn!(error = %e, "seller rating not saved");
        }
    }

    fn housekeeping(&mut self) {
        match self.catalog.load_error() {
            None => {
                let known = self.catalog.ids();
                self.favorites.retain_existing(|id| known.contains(&id));
                self.photos.sweep_orphans(&known);
            }
            Some(reason) => {
                tracing::info!(%reason, "catalog not read, skipping favorites and photo cleanup");
            }
        }
        self.refresh_own_rating();
    }
}
