use serde::Deserialize;
use tracing::info;

use diecast_shared::error::MarketError;
use diecast_shared::photo::PhotoAttachment;
use diecast_shared::types::{Condition, ProductId, ProductStatus, Rarity};
use diecast_store::{ProductDraft, ProductEdit};

use super::{lock, user_message};
use crate::projection::{self, ProductCard, ProductDetail};
use crate::state::SharedState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraftDto {
    pub title: String,
    pub price: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub condition: Condition,
    pub city: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEditDto {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub description: Option<String>,
    pub rarity: Option<Rarity>,
    pub condition: Option<Condition>,
    pub city: Option<String>,
}

/// Attach a photo to the listing being composed. Returns the photo count.
pub fn attach_photo(state: &SharedState, mime: String, bytes: Vec<u8>) -> Result<usize, String> {
    let mut guard = lock(state)?;
    guard
        .pending_photos
        .attach(PhotoAttachment::new(mime, bytes))
        .map_err(|e| user_message(e.into()))
}

pub fn remove_photo(state: &SharedState, index: usize) -> Result<usize, String> {
    let mut guard = lock(state)?;
    guard.pending_photos.remove(index);
    Ok(guard.pending_photos.len())
}

/// Throw away the listing being composed.
pub fn discard_draft(state: &SharedState) -> Result<(), String> {
    lock(state)?.pending_photos.clear();
    Ok(())
}

/// Publish the composed listing with the attached photos.
pub fn create_listing(state: &SharedState, draft: ListingDraftDto) -> Result<ProductDetail, String> {
    let mut guard = lock(state)?;
    let owner = guard.identity.current().clone();
    let draft = ProductDraft {
        title: draft.title,
        price: draft.price,
        description: draft.description,
        rarity: draft.rarity,
        condition: draft.condition,
        city: draft.city,
    };

    let photos = std::mem::take(&mut guard.pending_photos);
    let created = guard.catalog.create(draft, &photos, &owner);
    match created {
        Ok(product) => {
            info!(product_id = %product.id, "Listing published");
            projection::product_detail(&guard, product.id).map_err(user_message)
        }
        // The listing exists for this session; the draft is spent.
        Err(MarketError::StorageUnavailable) => Err(user_message(MarketError::StorageUnavailable)),
        Err(e) => {
            guard.pending_photos = photos;
            Err(user_message(e))
        }
    }
}

pub fn update_listing(
    state: &SharedState,
    id: ProductId,
    edit: ListingEditDto,
) -> Result<ProductDetail, String> {
    let mut guard = lock(state)?;
    let acting = guard.identity.current().clone();
    let edit = ProductEdit {
        title: edit.title,
        price: edit.price,
        description: edit.description,
        rarity: edit.rarity,
        condition: edit.condition,
        city: edit.city,
        status: None,
    };
    guard.catalog.update(id, edit, &acting).map_err(user_message)?;
    projection::product_detail(&guard, id).map_err(user_message)
}

/// Mark a listing sold, or put it back on sale.
pub fn set_sold(state: &SharedState, id: ProductId, sold: bool) -> Result<ProductDetail, String> {
    let mut guard = lock(state)?;
    let acting = guard.identity.current().clone();
    let status = if sold {
        ProductStatus::Sold
    } else {
        ProductStatus::Active
    };
    let edit = ProductEdit {
        status: Some(status),
        ..ProductEdit::default()
    };
    guard.catalog.update(id, edit, &acting).map_err(user_message)?;
    projection::product_detail(&guard, id).map_err(user_message)
}

pub fn delete_listing(state: &SharedState, id: ProductId) -> Result<(), String> {
    let mut guard = lock(state)?;
    let acting = guard.identity.current().clone();
    let app = &mut *guard;
    app.catalog
        .delete(id, &acting, &mut app.favorites)
        .map_err(user_message)
}

pub fn get_listing(state: &SharedState, id: ProductId) -> Result<ProductDetail, String> {
    let guard = lock(state)?;
    projection::product_detail(&guard, id).map_err(user_message)
}

pub fn home_feed(state: &SharedState, rarity: Option<Rarity>) -> Result<Vec<ProductCard>, String> {
    let guard = lock(state)?;
    Ok(projection::home_feed(&guard, rarity))
}

/// Search results, or `None` when the query is blank.
pub fn search(state: &SharedState, query: String) -> Result<Option<Vec<ProductCard>>, String> {
    let guard = lock(state)?;
    Ok(projection::search(&guard, &query))
}

pub fn my_listings(state: &SharedState) -> Result<Vec<ProductCard>, String> {
    let guard = lock(state)?;
    let me = guard.identity.current().id.clone();
    Ok(projection::seller_listings(&guard, &me, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::favorites::toggle_favorite;
    use crate::commands::test_state;

    fn draft(title: &str) -> ListingDraftDto {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "price": 4200,
            "rarity": "limited",
            "condition": "like_new",
            "city": "Kazan",
        }))
        .unwrap()
    }

    #[test]
    fn publish_consumes_attached_photos() {
        let state = test_state();
        attach_photo(&state, "image/webp".into(), vec![0; 8]).unwrap();
        assert_eq!(attach_photo(&state, "image/png".into(), vec![0; 8]), Ok(2));

        let detail = create_listing(&state, draft("Porsche 911 GT3")).unwrap();
        assert_eq!(detail.images.len(), 2);
        assert_eq!(detail.price, "4 200 ₽");
        assert_eq!(detail.rarity, "Limited Edition");
        assert!(detail.is_own);
        assert!(state.lock().unwrap().pending_photos.is_empty());

        assert_eq!(my_listings(&state).unwrap().len(), 1);
        assert_eq!(home_feed(&state, Some(Rarity::Limited)).unwrap().len(), 1);
        assert_eq!(home_feed(&state, Some(Rarity::Sth)).unwrap().len(), 0);
    }

    #[test]
    fn failed_publish_keeps_photos() {
        let state = test_state();
        attach_photo(&state, "image/jpeg".into(), vec![0; 8]).unwrap();

        let err = create_listing(&state, draft("   ")).unwrap_err();
        assert_eq!(err, "Enter a title");
        assert_eq!(state.lock().unwrap().pending_photos.len(), 1);
    }

    #[test]
    fn photo_rules_surface_as_messages() {
        let state = test_state();
        assert_eq!(
            attach_photo(&state, "image/gif".into(), vec![0; 8]),
            Err("Unsupported photo type: image/gif".to_string())
        );
        for _ in 0..3 {
            attach_photo(&state, "image/png".into(), vec![0; 8]).unwrap();
        }
        assert!(attach_photo(&state, "image/png".into(), vec![0; 8]).is_err());
        assert_eq!(remove_photo(&state, 0), Ok(2));
        discard_draft(&state).unwrap();
        assert_eq!(remove_photo(&state, 0), Ok(0));
    }

    #[test]
    fn edit_sell_and_delete() {
        let state = test_state();
        attach_photo(&state, "image/png".into(), vec![0; 8]).unwrap();
        let id = create_listing(&state, draft("Corvette")).unwrap().id;
        toggle_favorite(&state, id).unwrap();

        let edited = update_listing(
            &state,
            id,
            ListingEditDto {
                price: Some(3900),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(edited.price, "3 900 ₽");

        assert!(set_sold(&state, id, true).unwrap().sold);
        assert!(home_feed(&state, None).unwrap().is_empty());
        assert!(!set_sold(&state, id, false).unwrap().sold);

        delete_listing(&state, id).unwrap();
        assert_eq!(get_listing(&state, id).unwrap_err(), "Not found");
        assert!(!state.lock().unwrap().favorites.has(id));
        delete_listing(&state, id).unwrap();
    }

    #[test]
    fn search_blank_vs_miss() {
        let state = test_state();
        attach_photo(&state, "image/png".into(), vec![0; 8]).unwrap();
        create_listing(&state, draft("Corvette")).unwrap();

        assert_eq!(search(&state, " ".into()).unwrap(), None);
        assert_eq!(search(&state, "kazan".into()).unwrap().map(|r| r.len()), Some(1));
        assert_eq!(search(&state, "delorean".into()).unwrap(), Some(vec![]));
    }
}
