//! Catalog-wide core types
//!
//! These types are shared across all activations and the HTTP layer.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier for categories, nested nodes, items and features.
///
/// Parsed once at the boundary (path segments, query strings, JSON bodies) and
/// serialized back in its text form. Two forms are accepted: hyphenated UUIDs,
/// which is what the server generates, and 24-hex-digit ObjectIds, which older
/// data and the admin frontend carry. Nothing past the boundary ever sees a
/// raw string id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CatalogId {
    Uuid(Uuid),
    ObjectId([u8; 12]),
}

impl CatalogId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        CatalogId::Uuid(Uuid::new_v4())
    }

    /// Parse from either text form
    pub fn parse_str(s: &str) -> Result<Self, InvalidId> {
        let trimmed = s.trim();
        if trimmed.len() == 24 {
            let mut bytes = [0u8; 12];
            return hex::decode_to_slice(trimmed, &mut bytes)
                .map(|_| CatalogId::ObjectId(bytes))
                .map_err(|_| InvalidId(s.to_string()));
        }
        Uuid::from_str(trimmed)
            .map(CatalogId::Uuid)
            .map_err(|_| InvalidId(s.to_string()))
    }
}

impl Default for CatalogId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogId::Uuid(uuid) => write!(f, "{}", uuid),
            CatalogId::ObjectId(bytes) => f.write_str(&hex::encode(bytes)),
        }
    }
}

impl FromStr for CatalogId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<Uuid> for CatalogId {
    fn from(uuid: Uuid) -> Self {
        CatalogId::Uuid(uuid)
    }
}

impl Serialize for CatalogId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CatalogId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A string that is not a syntactically valid identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {0:?}")]
pub struct InvalidId(pub String);

/// Current Unix timestamp in seconds
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
