//! In-memory edits of a single loaded root.
//!
//! These only touch the `Category` value handed in; persisting the whole
//! document afterwards is the caller's job. An error leaves the root as it
//! was.

use super::tree::{assign_identifier, ensure_identifiers, find_in_mut};
use super::types::{CatalogError, Category, Node, NodeInput, NodePatch};
use crate::types::CatalogId;

/// Append `new_node` (with identifiers assigned throughout) under `parent_id`,
/// or directly under the root when no parent is given. Returns the new
/// node's identifier.
pub fn insert_node(
    root: &mut Category,
    parent_id: Option<CatalogId>,
    new_node: &NodeInput,
) -> Result<CatalogId, CatalogError> {
    let node = assign_identifier(new_node)?;
    let id = node.id;

    let siblings = match parent_id {
        None => &mut root.subcategories,
        Some(parent) if parent == root.id => &mut root.subcategories,
        Some(parent) => {
            &mut find_in_mut(&mut root.subcategories, &parent)
                .ok_or(CatalogError::ParentNotFound(parent))?
                .subcategories
        }
    };
    siblings.push(node);

    Ok(id)
}

/// Overwrite a nested node's name and image. Children are replaced only when
/// the patch carries a full `subcategories` array. Blank strings leave the
/// current value in place.
pub fn update_node<'a>(
    root: &'a mut Category,
    node_id: CatalogId,
    patch: &NodePatch,
) -> Result<&'a Node, CatalogError> {
    // Resolve everything fallible before the first write
    let children = patch
        .subcategories
        .as_deref()
        .map(ensure_identifiers)
        .transpose()?;

    let node = find_in_mut(&mut root.subcategories, &node_id)
        .ok_or(CatalogError::NodeNotFound(node_id))?;

    if let Some(name) = patch.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        node.name = name.to_string();
    }
    if let Some(url) = patch.image_url.as_deref().filter(|u| !u.is_empty()) {
        node.image_url = Some(url.to_string());
    }
    if let Some(children) = children {
        node.subcategories = children;
    }

    Ok(node)
}

/// Splice a nested node out of whichever array holds it, taking its whole
/// subtree along. Returns the removed subtree.
pub fn remove_node(root: &mut Category, node_id: CatalogId) -> Result<Node, CatalogError> {
    remove_from(&mut root.subcategories, &node_id).ok_or(CatalogError::NodeNotFound(node_id))
}

fn remove_from(nodes: &mut Vec<Node>, id: &CatalogId) -> Option<Node> {
    for i in 0..nodes.len() {
        if nodes[i].id == *id {
            return Some(nodes.remove(i));
        }
        if let Some(removed) = remove_from(&mut nodes[i].subcategories, id) {
            return Some(removed);
        }
    }
    None
}
