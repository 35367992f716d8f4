use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// User identity = device-generated or platform-issued string
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Product id: creation time in milliseconds, bumped to stay strictly increasing.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(transparent)]
pub struct ReviewId(pub String);

impl ReviewId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collectible rarity tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Main,
    Sth,
    Th,
    Set,
    Special,
    Limited,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Main,
        Rarity::Sth,
        Rarity::Th,
        Rarity::Set,
        Rarity::Special,
        Rarity::Limited,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Sth => "sth",
            Self::Th => "th",
            Self::Set => "set",
            Self::Special => "special",
            Self::Limited => "limited",
        }
    }

    /// Human-readable label, also matched by free-text search.
    pub fn label(self) -> &'static str {
        match self {
            Self::Main => "Mainline",
            Self::Sth => "Super Treasure Hunt",
            Self::Th => "Treasure Hunt",
            Self::Set => "Set",
            Self::Special => "Special Edition",
            Self::Limited => "Limited Edition",
        }
    }
}

impl FromStr for Rarity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    #[default]
    New,
    LikeNew,
    Good,
    Used,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like_new",
            Self::Good => "good",
            Self::Used => "used",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::New => "New in package",
            Self::LikeNew => "Like new",
            Self::Good => "Good",
            Self::Used => "Used",
        }
    }
}

impl FromStr for Condition {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "like_new" => Ok(Self::LikeNew),
            "good" => Ok(Self::Good),
            "used" => Ok(Self::Used),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Sold,
}

impl ProductStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Sold => "sold",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown value: {0}")]
pub struct UnknownVariant(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_serializes_snake_case() {
        let json = serde_json::to_string(&Rarity::Sth).unwrap();
        assert_eq!(json, "\"sth\"");
        let cond = serde_json::to_string(&Condition::LikeNew).unwrap();
        assert_eq!(cond, "\"like_new\"");
    }

    #[test]
    fn rarity_from_str() {
        assert_eq!("limited".parse::<Rarity>().unwrap(), Rarity::Limited);
        assert!("gold".parse::<Rarity>().is_err());
    }

    #[test]
    fn product_id_parses_trimmed() {
        assert_eq!(" 42 ".parse::<ProductId>().unwrap(), ProductId(42));
        assert!("abc".parse::<ProductId>().is_err());
    }

    #[test]
    fn review_id_is_uuid_shaped() {
        let id = ReviewId::generate();
        assert_eq!(id.0.len(), 36);
        assert_eq!(id.0.matches('-').count(), 4);
    }
}
