//! Product feature types

use crate::types::CatalogId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which list a feature belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    UsageArea,
    ProductMeasurements,
    ProductProperties,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::UsageArea => "usage_area",
            FeatureKind::ProductMeasurements => "product_measurements",
            FeatureKind::ProductProperties => "product_properties",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureKind {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "usage_area" => Ok(FeatureKind::UsageArea),
            "product_measurements" => Ok(FeatureKind::ProductMeasurements),
            "product_properties" => Ok(FeatureKind::ProductProperties),
            other => Err(FeatureError::Validation(format!("unknown feature type: {}", other))),
        }
    }
}

/// A named product feature, unique per (name, type)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: CatalogId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    /// Whether products carry a value for this feature (e.g. a measurement)
    pub has_value: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Client payload for feature create/update.
///
/// `type` stays a string so that one bad entry in a bulk request becomes an
/// error message for that entry instead of rejecting the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub has_value: Option<bool>,
}

/// Fields of a [`FeatureInput`] that passed validation for creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeature {
    pub name: String,
    pub description: Option<String>,
    pub kind: FeatureKind,
    pub has_value: bool,
}

impl FeatureInput {
    pub fn into_new(self) -> Result<NewFeature, FeatureError> {
        let name = self
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| FeatureError::Validation("name is required".into()))?
            .to_string();
        let kind = self
            .kind
            .as_deref()
            .ok_or_else(|| FeatureError::Validation("type is required".into()))?
            .parse()?;

        Ok(NewFeature {
            name,
            description: self.description.filter(|d| !d.is_empty()),
            kind,
            has_value: self.has_value.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkFeatureInput {
    #[serde(default)]
    pub features: Vec<FeatureInput>,
}

/// Outcome of a bulk create; failed entries never abort the batch
#[derive(Debug, Clone, Serialize)]
pub struct BulkCreateResult {
    pub message: String,
    pub features: Vec<Feature>,
    pub errors: Vec<String>,
}

/// Error type for feature operations
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("Feature not found: {0}")]
    NotFound(CatalogId),

    #[error("Feature '{name}' of type {kind} already exists")]
    AlreadyExists { name: String, kind: FeatureKind },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for FeatureError {
    fn from(err: sqlx::Error) -> Self {
        FeatureError::Storage(err.to_string())
    }
}
