//! Favorites: a membership set of product ids, session-global.

use std::collections::BTreeSet;

use diecast_shared::constants::KEY_FAVORITES;
use diecast_shared::error::Result;
use diecast_shared::types::ProductId;

use crate::codec;
use crate::kv::{KvStore, WriteStatus};

#[derive(Debug, Clone)]
pub struct Favorites {
    store: KvStore,
    ids: BTreeSet<ProductId>,
}

impl Favorites {
    /// Load the persisted set; unreadable data yields an empty set.
    pub fn load(store: KvStore) -> Self {
        let ids: BTreeSet<ProductId> =
            codec::decode_list_or_default::<ProductId>(KEY_FAVORITES, store.get(KEY_FAVORITES))
                .into_iter()
                .collect();
        tracing::debug!(count = ids.len(), "favorites loaded");
        Self { store, ids }
    }

    pub fn has(&self, id: ProductId) -> bool {
        self.ids.contains(&id)
    }

    /// Flip membership and return the new state.
    ///
    /// On a dropped write the in-memory flip is kept and
    /// `StorageUnavailable` is returned.
    pub fn toggle(&mut self, id: ProductId) -> Result<bool> {
        let now_member = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        tracing::info!(product_id = %id, favorite = now_member, "favorite toggled");
        self.persist().or_unavailable()?;
        Ok(now_member)
    }

    /// Remove `id` if present. Returns whether it was a member.
    pub fn remove_if_present(&mut self, id: ProductId) -> Result<bool> {
        if !self.ids.remove(&id) {
            return Ok(false);
        }
        self.persist().or_unavailable()?;
        Ok(true)
    }

    /// Drop every id for which `exists` is false. Returns how many were dropped.
    pub fn retain_existing(&mut self, exists: impl Fn(ProductId) -> bool) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| exists(*id));
        let dropped = before - self.ids.len();
        if dropped > 0 {
            tracing::info!(dropped, "pruned favorites of deleted listings");
            let _ = self.persist();
        }
        dropped
    }

    pub fn ids(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn persist(&self) -> WriteStatus {
        match codec::encode(&self.ids) {
            Some(json) => self.store.set(KEY_FAVORITES, &json),
            None => WriteStatus::Dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use diecast_shared::error::MarketError;

    use super::*;
    use crate::memory::MemoryBackend;

    #[test]
    fn toggle_is_its_own_inverse() {
        let mut favorites = Favorites::load(KvStore::in_memory());
        let id = ProductId(42);

        assert!(!favorites.has(id));
        assert!(favorites.toggle(id).unwrap());
        assert!(favorites.has(id));
        assert!(!favorites.toggle(id).unwrap());
        assert!(!favorites.has(id));
    }

    #[test]
    fn persisted_as_json_array() {
        let store = KvStore::in_memory();
        let mut favorites = Favorites::load(store.clone());
        favorites.toggle(ProductId(2)).unwrap();
        favorites.toggle(ProductId(1)).unwrap();

        assert_eq!(store.get(KEY_FAVORITES).as_deref(), Some("[1,2]"));
        let reloaded = Favorites::load(store);
        assert!(reloaded.has(ProductId(1)) && reloaded.has(ProductId(2)));
    }

    #[test]
    fn remove_if_present_tolerates_absence() {
        let mut favorites = Favorites::load(KvStore::in_memory());
        assert!(!favorites.remove_if_present(ProductId(5)).unwrap());
        favorites.toggle(ProductId(5)).unwrap();
        assert!(favorites.remove_if_present(ProductId(5)).unwrap());
        assert!(favorites.is_empty());
    }

    #[test]
    fn corrupt_value_loads_empty() {
        let store = KvStore::in_memory();
        let _ = store.set(KEY_FAVORITES, "{\"oops\":true}");
        assert!(Favorites::load(store).is_empty());
    }

    #[test]
    fn dropped_write_keeps_session_state() {
        let backend = MemoryBackend::new();
        let mut favorites = Favorites::load(KvStore::new(backend.clone()));
        backend.set_quota(Some(0));

        assert_eq!(
            favorites.toggle(ProductId(9)),
            Err(MarketError::StorageUnavailable)
        );
        assert!(favorites.has(ProductId(9)));
    }

    #[test]
    fn retain_existing_prunes() {
        let mut favorites = Favorites::load(KvStore::in_memory());
        favorites.toggle(ProductId(1)).unwrap();
        favorites.toggle(ProductId(2)).unwrap();
        assert_eq!(favorites.retain_existing(|id| id == ProductId(2)), 1);
        assert_eq!(favorites.ids().collect::<Vec<_>>(), vec![ProductId(2)]);
    }
}
