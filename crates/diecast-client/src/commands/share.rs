use serde::Serialize;
use tracing::{debug, info};

use diecast_shared::share_link;
use diecast_shared::types::ProductId;

use super::{lock, user_message};
use crate::projection::{self, ProductDetail};
use crate::state::SharedState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenedLinkDto {
    /// Address to put back into the address bar; carries no query.
    pub location: String,
    pub product_id: Option<ProductId>,
    /// Whether the shared listing exists on this device.
    pub available: bool,
}

/// Consume the address the session was opened with.
pub fn open_location(state: &SharedState, location: String) -> Result<OpenedLinkDto, String> {
    let mut guard = lock(state)?;
    let link = share_link::consume(&location);

    let available = link
        .product_id
        .is_some_and(|id| guard.catalog.contains(id));
    if let Some(id) = link.product_id {
        info!(product_id = %id, available, "Opened shared link");
    } else {
        debug!("No shared product in location");
    }
    guard.shared_product = link.product_id.filter(|_| available);

    Ok(OpenedLinkDto {
        location: link.sanitized_location,
        product_id: link.product_id,
        available,
    })
}

/// Detail of the listing requested by the opening link, at most once.
pub fn take_shared_product(state: &SharedState) -> Result<Option<ProductDetail>, String> {
    let mut guard = lock(state)?;
    let Some(id) = guard.shared_product.take() else {
        return Ok(None);
    };
    projection::product_detail(&guard, id)
        .map(Some)
        .map_err(user_message)
}

pub fn share_listing(state: &SharedState, id: ProductId) -> Result<String, String> {
    let guard = lock(state)?;
    if !guard.catalog.contains(id) {
        return Err(user_message(diecast_shared::MarketError::NotFound));
    }
    share_link::share_url(&guard.config.base_url, id).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::products::{attach_photo, create_listing, ListingDraftDto};
    use crate::commands::test_state;

    fn publish(state: &SharedState) -> ProductId {
        attach_photo(state, "image/png".into(), vec![1; 4]).unwrap();
        let draft: ListingDraftDto = serde_json::from_value(serde_json::json!({
            "title": "Toyota AE86",
            "price": 2500,
            "city": "Vladivostok",
        }))
        .unwrap();
        create_listing(state, draft).unwrap().id
    }

    #[test]
    fn opening_a_link_scrubs_the_address() {
        let state = test_state();
        let id = publish(&state);

        let opened = open_location(
            &state,
            format!("https://market.example/app?product={id}&token=secret"),
        )
        .unwrap();
        assert_eq!(opened.location, "https://market.example/app");
        assert_eq!(opened.product_id, Some(id));
        assert!(opened.available);

        let detail = take_shared_product(&state).unwrap().unwrap();
        assert_eq!(detail.id, id);
        assert!(take_shared_product(&state).unwrap().is_none());
    }

    #[test]
    fn unknown_product_is_reported_unavailable() {
        let state = test_state();
        let opened = open_location(&state, "?product=77&user=%7B%7D".into()).unwrap();
        assert_eq!(opened.product_id, Some(ProductId(77)));
        assert!(!opened.available);
        assert!(!opened.location.contains("user"));
        assert!(take_shared_product(&state).unwrap().is_none());
    }

    #[test]
    fn share_link_round_trips() {
        let state = test_state();
        let id = publish(&state);
        let url = share_listing(&state, id).unwrap();
        assert_eq!(share_link::extract_shared_product_id(&url), Some(id));
        assert!(share_listing(&state, ProductId(3)).is_err());
    }
}
