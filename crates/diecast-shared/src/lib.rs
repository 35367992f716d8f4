//! # diecast-shared
//!
//! Domain vocabulary shared by the store and the client layer: identifier
//! newtypes, listing enums, limits, the error taxonomy, identity helpers,
//! photo attachment checks and the shareable-link resolver. Nothing in this
//! crate performs I/O.

pub mod constants;
pub mod error;
pub mod identity;
pub mod photo;
pub mod share_link;
pub mod types;

pub use error::{MarketError, ValidationError};
pub use types::{Condition, ProductId, ProductStatus, Rarity, ReviewId, UserId};
