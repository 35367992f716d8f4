use diecast_shared::types::ProductId;

use super::{lock, user_message};
use crate::projection::{self, ProductCard};
use crate::state::SharedState;

/// Flip a listing's favorite flag. Returns the new flag.
pub fn toggle_favorite(state: &SharedState, id: ProductId) -> Result<bool, String> {
    let mut guard = lock(state)?;
    if !guard.catalog.contains(id) {
        return Err(user_message(diecast_shared::MarketError::NotFound));
    }
    guard.favorites.toggle(id).map_err(user_message)
}

pub fn list_favorites(state: &SharedState) -> Result<Vec<ProductCard>, String> {
    let guard = lock(state)?;
    Ok(projection::favorites_view(&guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::products::{attach_photo, create_listing, ListingDraftDto};
    use crate::commands::test_state;

    #[test]
    fn toggle_twice_restores() {
        let state = test_state();
        attach_photo(&state, "image/png".into(), vec![1; 4]).unwrap();
        let draft: ListingDraftDto = serde_json::from_value(serde_json::json!({
            "title": "Datsun 510",
            "price": 1500,
            "city": "Perm",
        }))
        .unwrap();
        let id = create_listing(&state, draft).unwrap().id;

        assert_eq!(toggle_favorite(&state, id), Ok(true));
        assert_eq!(list_favorites(&state).unwrap().len(), 1);
        assert_eq!(toggle_favorite(&state, id), Ok(false));
        assert!(list_favorites(&state).unwrap().is_empty());
    }

    #[test]
    fn unknown_listing_cannot_be_favorited() {
        let state = test_state();
        assert_eq!(toggle_favorite(&state, ProductId(5)), Err("Not found".to_string()));
    }
}
