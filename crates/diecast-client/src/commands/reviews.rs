use serde::Deserialize;
use tracing::info;

use diecast_shared::constants::DEFAULT_DISPLAY_NAME;
use diecast_shared::types::{ProductId, ReviewId, UserId};
use diecast_store::ReviewSubmission;

use super::{lock, user_message};
use crate::projection::{self, SellerProfileView};
use crate::state::SharedState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInputDto {
    pub seller_id: UserId,
    pub rating: u8,
    pub text: String,
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

/// Leave or replace a review of a seller. Returns the seller's refreshed profile.
pub fn submit_review(state: &SharedState, input: ReviewInputDto) -> Result<SellerProfileView, String> {
    let mut guard = lock(state)?;
    let buyer = guard.identity.current().clone();

    let seller_name = guard
        .catalog
        .products_by_seller(&input.seller_id)
        .first()
        .map(|p| p.seller.name.clone())
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

    let review = guard
        .reviews
        .submit(
            ReviewSubmission {
                seller_id: input.seller_id.clone(),
                seller_name,
                rating: input.rating,
                text: input.text,
                product_id: input.product_id,
            },
            &buyer,
        )
        .map_err(user_message)?;

    info!(review_id = %review.id, seller = %review.seller_id, "Review saved");
    Ok(projection::seller_profile(&guard, &input.seller_id))
}

pub fn retract_review(state: &SharedState, review_id: String) -> Result<(), String> {
    let mut guard = lock(state)?;
    let acting = guard.identity.current().clone();
    guard
        .reviews
        .retract(&ReviewId(review_id), &acting)
        .map_err(user_message)
}

pub fn seller_profile(state: &SharedState, seller_id: UserId) -> Result<SellerProfileView, String> {
    let guard = lock(state)?;
    Ok(projection::seller_profile(&guard, &seller_id))
}

/// The session user's own seller profile.
pub fn my_profile(state: &SharedState) -> Result<SellerProfileView, String> {
    let mut guard = lock(state)?;
    guard.refresh_own_rating();
    let me = guard.identity.current().id.clone();
    Ok(projection::seller_profile(&guard, &me))
}
