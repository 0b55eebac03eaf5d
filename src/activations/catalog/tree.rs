//! Recursive walks over the embedded category forest
//!
//! Everything here is synchronous and allocation-light: the forest is loaded
//! once per request and passed in explicitly, never held globally.

use super::types::{CatalogError, Category, Node, NodeInput, NodeSummary};
use crate::types::CatalogId;
use std::collections::HashSet;

/// Read access shared by root categories and nested nodes
pub trait TreeNode {
    fn id(&self) -> CatalogId;
    fn name(&self) -> &str;
    fn image_url(&self) -> Option<&str>;
    fn subcategories(&self) -> &[Node];
}

impl TreeNode for Category {
    fn id(&self) -> CatalogId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn subcategories(&self) -> &[Node] {
        &self.subcategories
    }
}

impl TreeNode for Node {
    fn id(&self) -> CatalogId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    fn subcategories(&self) -> &[Node] {
        &self.subcategories
    }
}

/// A located node: either a root category itself or something nested below one
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Category),
    Nested(&'a Node),
}

impl NodeRef<'_> {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeRef::Root(_))
    }

    pub fn summary(&self) -> NodeSummary {
        NodeSummary {
            id: self.id(),
            name: self.name().to_string(),
            image_url: self.image_url().map(str::to_string),
            has_subcategories: !self.subcategories().is_empty(),
            is_root: self.is_root(),
        }
    }
}

impl TreeNode for NodeRef<'_> {
    fn id(&self) -> CatalogId {
        match self {
            NodeRef::Root(category) => category.id,
            NodeRef::Nested(node) => node.id,
        }
    }

    fn name(&self) -> &str {
        match self {
            NodeRef::Root(category) => &category.name,
            NodeRef::Nested(node) => &node.name,
        }
    }

    fn image_url(&self) -> Option<&str> {
        match self {
            NodeRef::Root(category) => category.image_url.as_deref(),
            NodeRef::Nested(node) => node.image_url.as_deref(),
        }
    }

    fn subcategories(&self) -> &[Node] {
        match self {
            NodeRef::Root(category) => &category.subcategories,
            NodeRef::Nested(node) => &node.subcategories,
        }
    }
}

/// Owning root plus the chain of nodes below it, ending at the target.
///
/// `path` is empty when the target is the root itself.
#[derive(Debug, Clone)]
pub struct RootPath<'a> {
    pub root: &'a Category,
    pub path: Vec<&'a Node>,
}

impl<'a> RootPath<'a> {
    pub fn target(&self) -> NodeRef<'a> {
        match self.path.last().copied() {
            Some(node) => NodeRef::Nested(node),
            None => NodeRef::Root(self.root),
        }
    }

    /// Levels below the root (0 for the root itself)
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

// ============================================================================
// Identity assignment
// ============================================================================

/// Populate identifiers at every level of a client-supplied subtree.
///
/// Supplied ids are parsed into their canonical form; absent or blank ones are
/// generated. An empty image URL is dropped; names, other images and child
/// order are carried over untouched. Running this over its own output (via
/// `NodeInput::from`) yields the same identifiers.
pub fn ensure_identifiers(nodes: &[NodeInput]) -> Result<Vec<Node>, CatalogError> {
    nodes.iter().map(assign_identifier).collect()
}

/// [`ensure_identifiers`] for a single node and its descendants
pub fn assign_identifier(input: &NodeInput) -> Result<Node, CatalogError> {
    let id = match input.id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => CatalogId::parse_str(raw)?,
        _ => CatalogId::new(),
    };

    Ok(Node {
        id,
        name: input.name.clone(),
        image_url: input.image_url.clone().filter(|url| !url.is_empty()),
        subcategories: ensure_identifiers(&input.subcategories)?,
    })
}

// ============================================================================
// Lookup
// ============================================================================

/// Depth-first search across every root and its descendants
pub fn find_node_by_id<'a>(roots: &'a [Category], id: &CatalogId) -> Option<NodeRef<'a>> {
    roots.iter().find_map(|root| {
        if root.id == *id {
            Some(NodeRef::Root(root))
        } else {
            find_in(&root.subcategories, id).map(NodeRef::Nested)
        }
    })
}

/// Depth-first search within one `subcategories` array
pub fn find_in<'a>(nodes: &'a [Node], id: &CatalogId) -> Option<&'a Node> {
    for node in nodes {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find_in(&node.subcategories, id) {
            return Some(found);
        }
    }
    None
}

/// Mutable counterpart of [`find_in`]
pub fn find_in_mut<'a>(nodes: &'a mut [Node], id: &CatalogId) -> Option<&'a mut Node> {
    for node in nodes.iter_mut() {
        if node.id == *id {
            return Some(node);
        }
        if let Some(found) = find_in_mut(&mut node.subcategories, id) {
            return Some(found);
        }
    }
    None
}

/// Find the root owning `id` and the node chain leading to it
pub fn find_root_and_path<'a>(roots: &'a [Category], id: &CatalogId) -> Option<RootPath<'a>> {
    for root in roots {
        if root.id == *id {
            return Some(RootPath {
                root,
                path: Vec::new(),
            });
        }

        let mut path = Vec::new();
        if path_to(&root.subcategories, id, &mut path) {
            return Some(RootPath { root, path });
        }
    }
    None
}

fn path_to<'a>(nodes: &'a [Node], id: &CatalogId, path: &mut Vec<&'a Node>) -> bool {
    for node in nodes {
        path.push(node);
        if node.id == *id || path_to(&node.subcategories, id, path) {
            return true;
        }
        path.pop();
    }
    false
}

// ============================================================================
// Descendants
// ============================================================================

/// Identifiers of every node strictly below `node`, in depth-first order
pub fn collect_descendant_ids<N: TreeNode + ?Sized>(node: &N) -> Vec<CatalogId> {
    let mut ids = Vec::new();
    collect_into(node.subcategories(), &mut ids);
    ids
}

fn collect_into(nodes: &[Node], ids: &mut Vec<CatalogId>) {
    for node in nodes {
        ids.push(node.id);
        collect_into(&node.subcategories, ids);
    }
}

// ============================================================================
// Write-time checks
// ============================================================================

/// Every node in the subtree must have a non-blank name
pub fn validate_names(nodes: &[Node]) -> Result<(), CatalogError> {
    for node in nodes {
        if node.name.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "subcategory {} has an empty name",
                node.id
            )));
        }
        validate_names(&node.subcategories)?;
    }
    Ok(())
}

/// Reject a candidate root whose identifiers repeat within itself or collide
/// with a node of another root. The candidate's own stored copy in `forest`
/// (same root id) is ignored.
pub fn check_unique_ids(candidate: &Category, forest: &[Category]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    seen.insert(candidate.id);
    for id in collect_descendant_ids(candidate) {
        if !seen.insert(id) {
            return Err(CatalogError::InvalidIdentifier(format!(
                "{} appears more than once in category '{}'",
                id, candidate.name
            )));
        }
    }

    for other in forest.iter().filter(|other| other.id != candidate.id) {
        let clash = std::iter::once(other.id)
            .chain(collect_descendant_ids(other))
            .find(|id| seen.contains(id));
        if let Some(id) = clash {
            return Err(CatalogError::InvalidIdentifier(format!(
                "{} is already used in category '{}'",
                id, other.name
            )));
        }
    }

    Ok(())
}
