use crate::types::{CatalogId, InvalidId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Category forest
// ============================================================================

/// A nested subcategory. Nodes carry their own children, so a root category
/// document holds its entire subtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique across the whole forest, not just among siblings
    #[serde(alias = "_id")]
    pub id: CatalogId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Children in display order
    #[serde(default)]
    pub subcategories: Vec<Node>,
}

/// A root category and the document it is persisted as
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Assigned at creation, immutable afterwards
    #[serde(alias = "_id")]
    pub id: CatalogId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub subcategories: Vec<Node>,

    /// Creation timestamp (Unix seconds)
    pub created_at: i64,

    /// Last modified timestamp (Unix seconds)
    pub updated_at: i64,
}

/// Client-supplied node, possibly without an identifier yet.
///
/// `id` stays a raw string here; it only becomes a [`CatalogId`] once the
/// identity assigner has parsed or generated it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeInput {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub subcategories: Vec<NodeInput>,
}

impl NodeInput {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_children(mut self, children: Vec<NodeInput>) -> Self {
        self.subcategories = children;
        self
    }
}

impl From<&Node> for NodeInput {
    fn from(node: &Node) -> Self {
        NodeInput {
            id: Some(node.id.to_string()),
            name: node.name.clone(),
            image_url: node.image_url.clone(),
            subcategories: node.subcategories.iter().map(NodeInput::from).collect(),
        }
    }
}

/// Whole-tree payload for category create/update.
///
/// On update, absent fields keep their stored value; a present
/// `subcategories` array replaces the entire subtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub subcategories: Option<Vec<NodeInput>>,
}

/// Field-level edit of a single nested node
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePatch {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    /// Full replacement of the node's children, if supplied
    #[serde(default)]
    pub subcategories: Option<Vec<NodeInput>>,
}

/// Payload for inserting a node under a root or nested parent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcategoryInput {
    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub image_url: Option<String>,
}

/// Display-level view of a root or nested node
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeSummary {
    pub id: CatalogId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub has_subcategories: bool,
    pub is_root: bool,
}

// ============================================================================
// Items
// ============================================================================

/// A product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: CatalogId,

    pub barcode: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Owning root category name, derived from `category_id` on every write
    pub category: String,

    /// Most specific node the product belongs to (root or nested)
    pub category_id: CatalogId,

    /// Referenced node's own name when it is nested, empty for roots
    #[serde(default)]
    pub subcategory: String,

    /// Legacy addressing field, matched alongside `category_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<CatalogId>,

    /// Number or free text, stored as given
    pub price: Value,

    #[serde(default)]
    pub specs: Vec<String>,

    #[serde(default)]
    pub images: Vec<String>,

    pub created_at: i64,

    pub updated_at: i64,
}

/// Client payload for item create/update.
///
/// Carries no `category`/`subcategory` name fields. Names are derived from
/// `category_id` against the live forest; client-sent names are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemInput {
    #[serde(default)]
    pub barcode: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category_id: Option<String>,

    /// Legacy reference; on update an empty string clears the stored one
    #[serde(default)]
    pub subcategory_id: Option<String>,

    #[serde(default)]
    pub price: Option<Value>,

    #[serde(default)]
    pub specs: Option<Vec<String>>,

    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// Identifier references of an [`ItemInput`] that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRefs {
    pub category_id: CatalogId,
    pub subcategory_id: Option<CatalogId>,
}

impl ItemInput {
    /// Check required fields and parse references without touching storage.
    ///
    /// `categoryId` is always required. Creation additionally requires
    /// `barcode`, `name` and `price`; on update they may be omitted and keep
    /// their stored values.
    pub fn validate(&self, creating: bool) -> Result<ItemRefs, CatalogError> {
        let raw_category = self
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CatalogError::Validation("categoryId is required".into()))?;
        let category_id = CatalogId::parse_str(raw_category)?;

        let subcategory_id = match self.subcategory_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(CatalogId::parse_str(raw)?),
            _ => None,
        };

        for (field, value) in [("barcode", &self.barcode), ("name", &self.name)] {
            match value.as_deref().map(str::trim) {
                Some("") => {
                    return Err(CatalogError::Validation(format!("{} must not be empty", field)))
                }
                None if creating => {
                    return Err(CatalogError::Validation(format!("{} is required", field)))
                }
                _ => {}
            }
        }

        match &self.price {
            Some(Value::Null) => {
                return Err(CatalogError::Validation("price must not be null".into()))
            }
            None if creating => return Err(CatalogError::Validation("price is required".into())),
            _ => {}
        }

        Ok(ItemRefs {
            category_id,
            subcategory_id,
        })
    }
}

// ============================================================================
// Query results
// ============================================================================

/// Products under a node, plus the identifiers the query covered
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductScope {
    /// Owning root category
    pub category: NodeSummary,
    /// The node the query was made for, set only when it is nested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<NodeSummary>,
    pub scope_ids: Vec<CatalogId>,
    pub products: Vec<Item>,
    pub total_products: usize,
}

/// Item counts for a node's scope, used to diagnose missing products
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HierarchyReport {
    pub category: NodeSummary,
    pub subcategories_count: usize,
    pub scope_ids: Vec<CatalogId>,
    /// Items whose `categoryId` is the node itself
    pub in_category: usize,
    /// Items whose legacy `subcategoryId` falls anywhere in the scope
    pub in_subcategories: usize,
    /// Items matched by either reference
    pub total: usize,
}

// ============================================================================
// Error Types
// ============================================================================

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(CatalogId),

    #[error("Subcategory not found: {0}")]
    NodeNotFound(CatalogId),

    #[error("Parent subcategory not found: {0}")]
    ParentNotFound(CatalogId),

    #[error("Item not found: {0}")]
    ItemNotFound(CatalogId),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<InvalidId> for CatalogError {
    fn from(err: InvalidId) -> Self {
        CatalogError::InvalidIdentifier(err.0)
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Storage(format!("Malformed document: {}", err))
    }
}
