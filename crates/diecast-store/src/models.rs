//! Record schemas persisted in the client key-value store.
//!
//! Field names are stored in `camelCase`. Every field that older records may
//! lack carries a `#[serde(default)]`, so a missing field resolves to the
//! documented default instead of failing the whole record.

use chrono::{DateTime, Utc};
use diecast_shared::constants::{DEFAULT_DISPLAY_NAME, DEFAULT_RATING};
use diecast_shared::types::{Condition, ProductId, ProductStatus, Rarity, ReviewId, UserId};
use serde::{Deserialize, Serialize};

fn now() -> DateTime<Utc> {
    Utc::now()
}

fn default_rating() -> f64 {
    DEFAULT_RATING
}

fn default_display_name() -> String {
    DEFAULT_DISPLAY_NAME.to_string()
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// The session user. Exactly one is resident per device session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default = "default_display_name")]
    pub display_name: String,
    /// Messaging handle without the leading `@`.
    #[serde(default)]
    pub handle: String,
    /// Single uppercase letter shown in place of a profile picture.
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub city: String,
    /// Where buyers reach the user, e.g. `@collector`.
    #[serde(default)]
    pub contact: String,
    #[serde(default = "now")]
    pub registered_at: DateTime<Utc>,
    /// Aggregate seller rating mirrored from the review ledger.
    #[serde(default = "default_rating")]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
}

impl User {
    /// A stored user is usable only if it has an id and a finite rating.
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty() && self.rating.is_finite()
    }

    /// Frozen copy of the public profile, embedded into new listings.
    pub fn seller_snapshot(&self) -> SellerSnapshot {
        SellerSnapshot {
            id: self.id.clone(),
            name: self.display_name.clone(),
            avatar: self.avatar.clone(),
            contact: self.contact.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// Seller details as they were when a listing was published.
///
/// Not a live reference: later profile edits do not rewrite old listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SellerSnapshot {
    pub id: UserId,
    #[serde(default = "default_display_name")]
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub contact: String,
}

/// A listing. Photos are not embedded; they live in the photo blob store and
/// are rehydrated into [`Product::images`] on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: u64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default)]
    pub condition: Condition,
    #[serde(default)]
    pub city: String,
    pub seller: SellerSnapshot,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub has_photos: bool,
    #[serde(default)]
    pub photo_count: u8,
    #[serde(skip)]
    pub images: Vec<String>,
}

impl Product {
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.seller.id == user
    }
}

/// Fields of a new listing as entered by the seller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub price: u64,
    pub description: String,
    pub rarity: Rarity,
    pub condition: Condition,
    pub city: String,
}

/// Partial edit of an existing listing; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductEdit {
    pub title: Option<String>,
    pub price: Option<u64>,
    pub description: Option<String>,
    pub rarity: Option<Rarity>,
    pub condition: Option<Condition>,
    pub city: Option<String>,
    pub status: Option<ProductStatus>,
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Buyer feedback on a seller. At most one per (seller, buyer) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub seller_id: UserId,
    #[serde(default)]
    pub seller_name: String,
    pub buyer_id: UserId,
    #[serde(default)]
    pub buyer_name: String,
    pub rating: u8,
    #[serde(default)]
    pub text: String,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Listing the review was left from, if any.
    #[serde(default)]
    pub product_id: Option<ProductId>,
}

impl Review {
    pub fn last_changed(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub seller_id: UserId,
    pub seller_name: String,
    pub rating: u8,
    pub text: String,
    pub product_id: Option<ProductId>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Editable profile fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileEdit {
    pub display_name: Option<String>,
    pub handle: Option<String>,
    pub city: Option<String>,
    pub contact: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_missing_fields_take_defaults() {
        let user: User = serde_json::from_str(r#"{"id":"17000000000abcdef"}"#).unwrap();
        assert_eq!(user.display_name, "User");
        assert_eq!(user.rating, 5.0);
        assert_eq!(user.review_count, 0);
        assert!(user.is_valid());
    }

    #[test]
    fn user_with_blank_id_is_invalid() {
        let user: User = serde_json::from_str(r#"{"id":"  "}"#).unwrap();
        assert!(!user.is_valid());
    }

    #[test]
    fn product_images_are_not_persisted() {
        let product = Product {
            id: ProductId(1),
            title: "Ferrari F40".into(),
            price: 5900,
            description: String::new(),
            rarity: Rarity::Sth,
            condition: Condition::New,
            city: "Moscow".into(),
            seller: SellerSnapshot {
                id: UserId::from("u1"),
                name: "Ivan".into(),
                avatar: "I".into(),
                contact: String::new(),
            },
            created_at: Utc::now(),
            status: ProductStatus::Active,
            has_photos: true,
            photo_count: 1,
            images: vec!["data:image/png;base64,AAAA".into()],
        };
        let json = serde_json::to_string(&product).unwrap();
        assert!(!json.contains("images"));
        assert!(json.contains("\"photoCount\":1"));
        assert!(json.contains("\"rarity\":\"sth\""));

        let back: Product = serde_json::from_str(&json).unwrap();
        assert!(back.images.is_empty());
        assert_eq!(back.photo_count, 1);
    }
}
