//! Catalog activation
//!
//! Category forest stored as nested documents, resolution of any node to its
//! root and descendants, and products scoped to a node.

mod activation;
mod index;
mod mutate;
mod resolve;
mod service;
mod storage;
mod tree;
mod types;

#[cfg(test)]
mod tests;

pub use activation::catalog_router;
pub use index::ForestIndex;
pub use mutate::{insert_node, remove_node, update_node};
pub use resolve::{bind_item_category, resolve_scope, CategoryBinding, CategoryRef};
pub use service::CatalogService;
pub use storage::{CatalogStorage, CatalogStorageConfig, ItemFilter};
pub use tree::{
    collect_descendant_ids, ensure_identifiers, find_node_by_id, find_root_and_path, NodeRef,
    RootPath, TreeNode,
};
pub use types::{
    CatalogError, Category, CategoryInput, HierarchyReport, Item, ItemInput, Node, NodeInput,
    NodePatch, NodeSummary, ProductScope, SubcategoryInput,
};
