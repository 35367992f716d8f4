//! Catalog repository: product listings and their lifecycle.
//!
//! Listing records live under a single key; photos are kept per slot in the
//! [`PhotoStore`] and joined back in on read. The listing record is always
//! written before its photo slots.

use std::cmp::Reverse;
use std::collections::HashSet;

use chrono::Utc;
use diecast_shared::constants::{KEY_PRODUCTS, MAX_PRICE, MIN_PRICE};
use diecast_shared::error::{MarketError, Result, ValidationError};
use diecast_shared::photo::PendingPhotos;
use diecast_shared::types::{ProductId, ProductStatus, Rarity, UserId};

use crate::codec;
use crate::error::DecodeError;
use crate::favorites::Favorites;
use crate::kv::{KvStore, WriteStatus};
use crate::models::{Product, ProductDraft, ProductEdit, User};
use crate::photos::PhotoStore;

/// Which listings [`Catalog::list`] returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub rarity: Option<Rarity>,
    pub include_sold: bool,
}

impl ListFilter {
    pub fn rarity(rarity: Rarity) -> Self {
        Self {
            rarity: Some(rarity),
            ..Self::default()
        }
    }
}

/// Result of a catalog search. A blank query is not the same as a query that
/// matched nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome<'a> {
    NoQuery,
    Matches(Vec<&'a Product>),
}

#[derive(Debug, Clone)]
pub struct Catalog {
    store: KvStore,
    photos: PhotoStore,
    products: Vec<Product>,
    load_error: Option<DecodeError>,
}

impl Catalog {
    /// Load the catalog. An unreadable value yields an empty catalog; the
    /// reason is kept in [`Catalog::load_error`].
    pub fn load(store: KvStore, photos: PhotoStore) -> Self {
        let (products, load_error) = match codec::decode_list(KEY_PRODUCTS, store.get(KEY_PRODUCTS)) {
            Ok(products) => (products, None),
            Err(e @ DecodeError::Absent { .. }) => (Vec::new(), Some(e)),
            Err(e) => {
                tracing::warn!(error = %e, "catalog unreadable, starting empty");
                (Vec::new(), Some(e))
            }
        };
        tracing::debug!(count = products.len(), "catalog loaded");
        Self {
            store,
            photos,
            products,
            load_error,
        }
    }

    /// Why the stored catalog could not be read at load, if it could not.
    ///
    /// While this is set the in-memory catalog says nothing about what other
    /// keys still reference, so nothing may be pruned against it.
    pub fn load_error(&self) -> Option<&DecodeError> {
        self.load_error.as_ref()
    }

    /// Listings matching `filter`, newest first.
    pub fn list(&self, filter: &ListFilter) -> Vec<&Product> {
        let mut out: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| filter.include_sold || p.is_active())
            .filter(|p| filter.rarity.map_or(true, |r| p.rarity == r))
            .collect();
        sort_newest_first(&mut out);
        out
    }

    /// Case-insensitive substring search over active listings.
    pub fn search(&self, query: &str) -> SearchOutcome<'_> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return SearchOutcome::NoQuery;
        }

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.is_active())
            .filter(|p| {
                [
                    p.title.as_str(),
                    p.description.as_str(),
                    p.city.as_str(),
                    p.rarity.label(),
                ]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            })
            .collect();
        sort_newest_first(&mut matches);
        tracing::debug!(query = %needle, hits = matches.len(), "catalog search");
        SearchOutcome::Matches(matches)
    }

    /// A listing with its photos rehydrated.
    pub fn get(&self, id: ProductId) -> Result<Product> {
        let product = self.find(id).ok_or(MarketError::NotFound)?;
        let mut product = product.clone();
        product.images = self.resolve_images(&product);
        Ok(product)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.find(id).is_some()
    }

    /// Every listing of a seller, sold ones included, newest first.
    pub fn products_by_seller(&self, seller_id: &UserId) -> Vec<&Product> {
        let mut out: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.is_owned_by(seller_id))
            .collect();
        sort_newest_first(&mut out);
        out
    }

    pub fn ids(&self) -> HashSet<ProductId> {
        self.products.iter().map(|p| p.id).collect()
    }

    pub fn resolve_images(&self, product: &Product) -> Vec<String> {
        self.photos.resolve(product.id, product.photo_count)
    }

    /// First available photo of a listing.
    pub fn cover_image(&self, product: &Product) -> Option<String> {
        (0..product.photo_count).find_map(|i| self.photos.get(product.id, i))
    }

    /// Publish a new listing owned by `owner`.
    ///
    /// Nothing is written unless every field validates. A dropped photo slot
    /// is tolerated; a dropped listing record is reported as
    /// `StorageUnavailable` while the listing stays in the session.
    pub fn create(
        &mut self,
        draft: ProductDraft,
        photos: &PendingPhotos,
        owner: &User,
    ) -> Result<Product> {
        let title = validate_title(&draft.title)?;
        validate_price(draft.price)?;
        let city = validate_city(&draft.city)?;
        if photos.is_empty() {
            return Err(ValidationError::NoPhotos.into());
        }

        let Some(id) = self.next_id() else {
            tracing::error!(
                last = ?self.products.iter().map(|p| p.id).max(),
                "product id space exhausted"
            );
            return Err(MarketError::StorageUnavailable);
        };
        let images = photos.data_uris();
        let product = Product {
            id,
            title,
            price: draft.price,
            description: draft.description.trim().to_string(),
            rarity: draft.rarity,
            condition: draft.condition,
            city,
            seller: owner.seller_snapshot(),
            created_at: Utc::now(),
            status: ProductStatus::Active,
            has_photos: true,
            photo_count: images.len() as u8,
            images: Vec::new(),
        };

        self.products.push(product.clone());
        let record = self.persist();

        for (index, uri) in images.iter().enumerate() {
            if !self.photos.put(id, index as u8, uri).is_stored() {
                tracing::warn!(product_id = %id, index, "photo slot not stored");
            }
        }

        tracing::info!(product_id = %id, seller = %owner.id, photos = images.len(), "listing created");
        record.or_unavailable()?;
        Ok(Product { images, ..product })
    }

    /// Edit a listing. Only its seller may do so.
    pub fn update(&mut self, id: ProductId, edit: ProductEdit, acting: &User) -> Result<Product> {
        let current = self.find(id).ok_or(MarketError::NotFound)?;
        if !current.is_owned_by(&acting.id) {
            tracing::warn!(product_id = %id, acting = %acting.id, "rejected foreign edit");
            return Err(MarketError::Forbidden);
        }

        let title = edit.title.as_deref().map(validate_title).transpose()?;
        if let Some(price) = edit.price {
            validate_price(price)?;
        }
        let city = edit.city.as_deref().map(validate_city).transpose()?;

        let Some(product) = self.products.iter_mut().find(|p| p.id == id) else {
            return Err(MarketError::NotFound);
        };
        if let Some(title) = title {
            product.title = title;
        }
        if let Some(price) = edit.price {
            product.price = price;
        }
        if let Some(description) = edit.description {
            product.description = description.trim().to_string();
        }
        if let Some(rarity) = edit.rarity {
            product.rarity = rarity;
        }
        if let Some(condition) = edit.condition {
            product.condition = condition;
        }
        if let Some(city) = city {
            product.city = city;
        }
        if let Some(status) = edit.status {
            product.status = status;
        }

        tracing::info!(product_id = %id, status = product.status.as_str(), "listing updated");
        self.persist().or_unavailable()?;
        self.get(id)
    }

    /// Delete a listing with its photo slots and favorites entry.
    ///
    /// Deleting an id that does not exist succeeds without doing anything.
    pub fn delete(&mut self, id: ProductId, acting: &User, favorites: &mut Favorites) -> Result<()> {
        let Some(pos) = self.products.iter().position(|p| p.id == id) else {
            tracing::debug!(product_id = %id, "delete of unknown listing ignored");
            return Ok(());
        };
        if !self.products[pos].is_owned_by(&acting.id) {
            tracing::warn!(product_id = %id, acting = %acting.id, "rejected foreign delete");
            return Err(MarketError::Forbidden);
        }

        let removed = self.products.remove(pos);
        let record = self.persist();
        if !self.photos.remove_all(id, removed.photo_count).is_stored() {
            tracing::warn!(product_id = %id, "photo slots left behind");
        }
        let favorite = favorites.remove_if_present(id);

        tracing::info!(product_id = %id, "listing deleted");
        record.or_unavailable()?;
        favorite.map(|_| ())
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Creation-time id, bumped past the newest existing one so ids stay
    /// unique and increasing even within the same millisecond. `None` once a
    /// stored id sits at the top of the range.
    fn next_id(&self) -> Option<ProductId> {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let after_last = match self.products.iter().map(|p| p.id.0).max() {
            Some(last) => last.checked_add(1)?,
            None => 0,
        };
        Some(ProductId(now.max(after_last)))
    }

    fn persist(&self) -> WriteStatus {
        match codec::encode(&self.products) {
            Some(json) => self.store.set(KEY_PRODUCTS, &json),
            None => WriteStatus::Dropped,
        }
    }
}

fn sort_newest_first(products: &mut [&Product]) {
    products.sort_by_key(|p| Reverse((p.created_at, p.id)));
}

fn validate_title(title: &str) -> std::result::Result<String, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(title.to_string())
}

fn validate_price(price: u64) -> std::result::Result<(), ValidationError> {
    if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
        return Err(ValidationError::PriceOutOfRange { price });
    }
    Ok(())
}

fn validate_city(city: &str) -> std::result::Result<String, ValidationError> {
    let city = city.trim();
    if city.is_empty() {
        return Err(ValidationError::EmptyCity);
    }
    Ok(city.to_string())
}
