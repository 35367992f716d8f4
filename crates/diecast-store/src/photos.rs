use std::collections::HashSet;

use diecast_shared::constants::PHOTO_KEY_PREFIX;
use diecast_shared::types::ProductId;

use crate::kv::{KvStore, WriteStatus};

/// Photo blob store: one data URI per `(product, slot)` key.
///
/// Slots are written independently of the listing record, so any slot may be
/// missing. Readers skip missing slots instead of failing.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    store: KvStore,
}

impl PhotoStore {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    pub fn key(product_id: ProductId, index: u8) -> String {
        format!("{PHOTO_KEY_PREFIX}{product_id}_{index}")
    }

    pub fn put(&self, product_id: ProductId, index: u8, data_uri: &str) -> WriteStatus {
        self.store.set(&Self::key(product_id, index), data_uri)
    }

    pub fn get(&self, product_id: ProductId, index: u8) -> Option<String> {
        self.store.get(&Self::key(product_id, index))
    }

    /// Photos in slots `0..count`, skipping slots that were never written.
    pub fn resolve(&self, product_id: ProductId, count: u8) -> Vec<String> {
        let images: Vec<String> = (0..count).filter_map(|i| self.get(product_id, i)).collect();
        if images.len() < count as usize {
            tracing::debug!(
                product_id = %product_id,
                expected = count,
                found = images.len(),
                "photo slots missing"
            );
        }
        images
    }

    // removes slots 0..count; slots past count are left to sweep_orphans
    pub fn remove_all(&self, product_id: ProductId, count: u8) -> WriteStatus {
        (0..count).fold(WriteStatus::Stored, |status, i| {
            status.and(self.store.remove(&Self::key(product_id, i)))
        })
    }

    /// Keys of photo slots whose product is not in `known`.
    pub fn orphaned(&self, known: &HashSet<ProductId>) -> Vec<String> {
        self.store
            .keys_with_prefix(PHOTO_KEY_PREFIX)
            .into_iter()
            .filter(|key| match parse_key(key) {
                Some((id, _)) => !known.contains(&id),
                None => true,
            })
            .collect()
    }

    /// Remove photo slots left behind by listings that no longer exist.
    /// Returns the number of slots removed.
    pub fn sweep_orphans(&self, known: &HashSet<ProductId>) -> usize {
        let orphans = self.orphaned(known);
        let removed = orphans
            .iter()
            .filter(|key| self.store.remove(key).is_stored())
            .count();
        if removed > 0 {
            tracing::info!(removed, "swept orphaned photo slots");
        }
        removed
    }
}

fn parse_key(key: &str) -> Option<(ProductId, u8)> {
    let rest = key.strip_prefix(PHOTO_KEY_PREFIX)?;
    let (id, index) = rest.rsplit_once('_')?;
    Some((id.parse().ok()?, index.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(PhotoStore::key(ProductId(42), 2), "hotwheels_photo_42_2");
        assert_eq!(parse_key("hotwheels_photo_42_2"), Some((ProductId(42), 2)));
        assert_eq!(parse_key("hotwheels_photo_x_2"), None);
    }

    #[test]
    fn resolve_skips_missing_slots() {
        let photos = PhotoStore::new(KvStore::in_memory());
        let id = ProductId(7);
        let _ = photos.put(id, 0, "data:a");
        let _ = photos.put(id, 2, "data:c");

        assert_eq!(photos.resolve(id, 3), vec!["data:a", "data:c"]);
        assert!(photos.resolve(id, 0).is_empty());
    }

    #[test]
    fn remove_all_clears_slots() {
        let photos = PhotoStore::new(KvStore::in_memory());
        let id = ProductId(7);
        for i in 0..3 {
            let _ = photos.put(id, i, "data:x");
        }
        assert!(photos.remove_all(id, 3).is_stored());
        assert!(photos.resolve(id, 3).is_empty());
    }

    #[test]
    fn sweeps_orphans_only() {
        let store = KvStore::in_memory();
        let photos = PhotoStore::new(store.clone());
        let _ = photos.put(ProductId(1), 0, "data:keep");
        let _ = photos.put(ProductId(2), 0, "data:orphan");
        let _ = photos.put(ProductId(2), 1, "data:orphan");
        let _ = store.set("hotwheels_products", "[]");

        let known: HashSet<ProductId> = [ProductId(1)].into_iter().collect();
        assert_eq!(photos.sweep_orphans(&known), 2);
        assert_eq!(photos.resolve(ProductId(1), 1), vec!["data:keep"]);
        assert!(store.get("hotwheels_products").is_some());
    }
}
