use thiserror::Error;

use crate::constants::{MAX_PHOTOS, MAX_PRICE, MAX_REVIEW_LEN, MIN_PRICE};

/// Errors surfaced by marketplace operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    /// User-correctable input problem; the message is shown verbatim.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Ownership or authorization violation. Deliberately carries no detail.
    #[error("This action is not permitted")]
    Forbidden,

    #[error("Not found")]
    NotFound,

    /// The store refused the write. In-memory state is still valid for the
    /// running session.
    #[error("Changes could not be saved and may be lost on reload")]
    StorageUnavailable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Enter a title")]
    EmptyTitle,

    #[error("{}", price_hint(.price))]
    PriceOutOfRange { price: u64 },

    #[error("Enter a city")]
    EmptyCity,

    #[error("Attach at least one photo")]
    NoPhotos,

    #[error("Unsupported photo type: {0}")]
    UnsupportedPhotoType(String),

    #[error("Photo is too large ({size} bytes, limit {max} bytes)")]
    PhotoTooLarge { size: usize, max: usize },

    #[error("Photo limit reached ({} max)", MAX_PHOTOS)]
    PhotoLimitReached,

    #[error("Rating must be between 1 and 5")]
    RatingOutOfRange(u8),

    #[error("Write a few words about the deal")]
    EmptyReviewText,

    #[error("Review is too long ({} characters max)", MAX_REVIEW_LEN)]
    ReviewTooLong,

    #[error("Name cannot be empty")]
    EmptyDisplayName,
}

fn price_hint(price: &u64) -> String {
    if *price < MIN_PRICE {
        format!("Price must be at least {MIN_PRICE}")
    } else {
        format!("Price must be at most {MAX_PRICE}")
    }
}

/// Convenience alias used by the repositories.
pub type Result<T> = std::result::Result<T, MarketError>;
