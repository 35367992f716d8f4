//! Review ledger: one review per (seller, buyer) pair, plus seller rating
//! aggregation.

use chrono::Utc;
use diecast_shared::constants::{
    DEFAULT_RATING, KEY_REVIEWS, MAX_REVIEW_LEN, MAX_REVIEW_RATING, MIN_REVIEW_RATING,
};
use diecast_shared::error::{MarketError, Result, ValidationError};
use diecast_shared::types::{ReviewId, UserId};
use serde::Serialize;

use crate::codec;
use crate::kv::{KvStore, WriteStatus};
use crate::models::{Review, ReviewSubmission, User};

/// Rating summary of a seller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerStats {
    pub rating: f64,
    pub review_count: u32,
}

#[derive(Debug, Clone)]
pub struct ReviewLedger {
    store: KvStore,
    reviews: Vec<Review>,
}

impl ReviewLedger {
    pub fn load(store: KvStore) -> Self {
        let reviews = codec::decode_list_or_default(KEY_REVIEWS, store.get(KEY_REVIEWS));
        tracing::debug!(count = reviews.len(), "review ledger loaded");
        Self { store, reviews }
    }

    /// Reviews about `seller_id`, in insertion order.
    pub fn list_for_seller(&self, seller_id: &UserId) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|r| &r.seller_id == seller_id)
            .collect()
    }

    pub fn find_existing(&self, seller_id: &UserId, buyer_id: &UserId) -> Option<&Review> {
        self.reviews
            .iter()
            .find(|r| &r.seller_id == seller_id && &r.buyer_id == buyer_id)
    }

    /// Create or overwrite the buyer's review of a seller.
    ///
    /// A second submission for the same pair keeps the review id and replaces
    /// rating, text and update time.
    pub fn submit(&mut self, submission: ReviewSubmission, buyer: &User) -> Result<Review> {
        if !(MIN_REVIEW_RATING..=MAX_REVIEW_RATING).contains(&submission.rating) {
            return Err(ValidationError::RatingOutOfRange(submission.rating).into());
        }
        let text = submission.text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyReviewText.into());
        }
        if text.chars().count() > MAX_REVIEW_LEN {
            return Err(ValidationError::ReviewTooLong.into());
        }
        if buyer.id == submission.seller_id {
            return Err(MarketError::Forbidden);
        }

        let now = Utc::now();
        let existing = self
            .reviews
            .iter_mut()
            .find(|r| r.seller_id == submission.seller_id && r.buyer_id == buyer.id);

        let review = match existing {
            Some(review) => {
                review.rating = submission.rating;
                review.text = text.to_string();
                review.buyer_name = buyer.display_name.clone();
                review.updated_at = Some(now);
                if submission.product_id.is_some() {
                    review.product_id = submission.product_id;
                }
                tracing::info!(review_id = %review.id, seller = %review.seller_id, "review updated");
                review.clone()
            }
            None => {
                let review = Review {
                    id: ReviewId::generate(),
                    seller_id: submission.seller_id,
                    seller_name: submission.seller_name,
                    buyer_id: buyer.id.clone(),
                    buyer_name: buyer.display_name.clone(),
                    rating: submission.rating,
                    text: text.to_string(),
                    created_at: now,
                    updated_at: None,
                    product_id: submission.product_id,
                };
                tracing::info!(review_id = %review.id, seller = %review.seller_id, "review created");
                self.reviews.push(review.clone());
                review
            }
        };

        self.persist().or_unavailable()?;
        Ok(review)
    }

    /// Remove a review. Only its author may do so; an unknown id is a no-op.
    pub fn retract(&mut self, review_id: &ReviewId, acting: &User) -> Result<()> {
        let Some(pos) = self.reviews.iter().position(|r| &r.id == review_id) else {
            return Ok(());
        };
        if self.reviews[pos].buyer_id != acting.id {
            return Err(MarketError::Forbidden);
        }
        self.reviews.remove(pos);
        tracing::info!(review_id = %review_id, "review retracted");
        self.persist().or_unavailable()
    }

    /// Mean rating of a seller; exactly 5.0 when the seller has no reviews.
    pub fn seller_rating(&self, seller_id: &UserId) -> f64 {
        self.seller_stats(seller_id).rating
    }

    pub fn seller_stats(&self, seller_id: &UserId) -> SellerStats {
        let (sum, count) = self
            .reviews
            .iter()
            .filter(|r| &r.seller_id == seller_id)
            .fold((0u32, 0u32), |(sum, count), r| (sum + r.rating as u32, count + 1));

        let rating = if count == 0 {
            DEFAULT_RATING
        } else {
            sum as f64 / count as f64
        };
        SellerStats {
            rating,
            review_count: count,
        }
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    fn persist(&self) -> WriteStatus {
        match codec::encode(&self.reviews) {
            Some(json) => self.store.set(KEY_REVIEWS, &json),
            None => WriteStatus::Dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: UserId::from(id),
            display_name: name.to_string(),
            handle: String::new(),
            avatar: name[..1].to_string(),
            city: String::new(),
            contact: String::new(),
            registered_at: Utc::now(),
            rating: DEFAULT_RATING,
            review_count: 0,
        }
    }

    fn submission(seller: &str, rating: u8, text: &str) -> ReviewSubmission {
        ReviewSubmission {
            seller_id: UserId::from(seller),
            seller_name: "Seller".to_string(),
            rating,
            text: text.to_string(),
            product_id: None,
        }
    }

    #[test]
    fn no_reviews_rates_five() {
        let ledger = ReviewLedger::load(KvStore::in_memory());
        let rating = ledger.seller_rating(&UserId::from("s"));
        assert_eq!(rating, 5.0);
        assert!(!rating.is_nan());
    }

    #[test]
    fn rating_is_mean_of_distinct_buyers() {
        let mut ledger = ReviewLedger::load(KvStore::in_memory());
        let ratings = [5u8, 4, 2, 3];
        for (i, r) in ratings.iter().enumerate() {
            let buyer = user(&format!("b{i}"), "Buyer");
            ledger.submit(submission("s", *r, "ok"), &buyer).unwrap();
        }
        let stats = ledger.seller_stats(&UserId::from("s"));
        assert_eq!(stats.review_count, 4);
        assert!((stats.rating - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn resubmission_overwrites_in_place() {
        let mut ledger = ReviewLedger::load(KvStore::in_memory());
        let buyer = user("b", "Buyer");
        let first = ledger.submit(submission("s", 2, "slow"), &buyer).unwrap();
        let second = ledger
            .submit(submission("s", 5, "arrived after all"), &buyer)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(ledger.list_for_seller(&UserId::from("s")).len(), 1);
        assert_eq!(ledger.seller_rating(&UserId::from("s")), 5.0);
        assert!(second.updated_at.is_some());
        assert_eq!(second.text, "arrived after all");
    }

    #[test]
    fn pair_is_ordered() {
        let mut ledger = ReviewLedger::load(KvStore::in_memory());
        let a = user("a", "Alice");
        let b = user("b", "Bob");
        ledger.submit(submission("b", 4, "fine"), &a).unwrap();
        ledger.submit(submission("a", 3, "fine"), &b).unwrap();

        assert!(ledger.find_existing(&UserId::from("b"), &a.id).is_some());
        assert!(ledger.find_existing(&UserId::from("a"), &b.id).is_some());
        assert!(ledger.find_existing(&UserId::from("a"), &a.id).is_none());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn rejects_invalid_submissions() {
        let mut ledger = ReviewLedger::load(KvStore::in_memory());
        let buyer = user("b", "Buyer");

        assert_eq!(
            ledger.submit(submission("s", 0, "x"), &buyer),
            Err(ValidationError::RatingOutOfRange(0).into())
        );
        assert_eq!(
            ledger.submit(submission("s", 6, "x"), &buyer),
            Err(ValidationError::RatingOutOfRange(6).into())
        );
        assert_eq!(
            ledger.submit(submission("s", 4, "   "), &buyer),
            Err(ValidationError::EmptyReviewText.into())
        );
        let long = "x".repeat(MAX_REVIEW_LEN + 1);
        assert_eq!(
            ledger.submit(submission("s", 4, &long), &buyer),
            Err(ValidationError::ReviewTooLong.into())
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn self_review_is_forbidden() {
        let mut ledger = ReviewLedger::load(KvStore::in_memory());
        let me = user("me", "Me");
        assert_eq!(
            ledger.submit(submission("me", 5, "great seller"), &me),
            Err(MarketError::Forbidden)
        );
        assert!(ledger.is_empty());
    }

    #[test]
    fn ledger_survives_reload() {
        let store = KvStore::in_memory();
        let mut ledger = ReviewLedger::load(store.clone());
        ledger
            .submit(submission("s", 4, "good packaging"), &user("b", "Buyer"))
            .unwrap();

        let reloaded = ReviewLedger::load(store);
        let reviews = reloaded.list_for_seller(&UserId::from("s"));
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].text, "good packaging");
        assert_eq!(reviews[0].buyer_name, "Buyer");
    }

    #[test]
    fn only_author_may_retract() {
        let mut ledger = ReviewLedger::load(KvStore::in_memory());
        let buyer = user("b", "Buyer");
        let review = ledger.submit(submission("s", 1, "bad"), &buyer).unwrap();

        assert_eq!(
            ledger.retract(&review.id, &user("s", "Seller")),
            Err(MarketError::Forbidden)
        );
        ledger.retract(&review.id, &buyer).unwrap();
        assert!(ledger.is_empty());
        ledger.retract(&review.id, &buyer).unwrap();
    }
}
