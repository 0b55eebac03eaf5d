//! Category references for products: which nodes a query covers and which
//! display names an item is stamped with.

use super::index::ForestIndex;
use super::tree::{collect_descendant_ids, NodeRef, TreeNode};
use super::types::{CatalogError, Category, Node};
use crate::types::CatalogId;

/// A category identifier resolved against the live forest
#[derive(Debug, Clone, Copy)]
pub enum CategoryRef<'a> {
    /// The identifier is a root category's own
    Root(&'a Category),
    /// The identifier belongs to a node `depth` levels below `root`
    Nested {
        root: &'a Category,
        node: &'a Node,
        depth: usize,
    },
}

impl<'a> CategoryRef<'a> {
    pub fn resolve(index: &ForestIndex<'a>, id: &CatalogId) -> Result<Self, CatalogError> {
        let found = index
            .root_and_path(id)
            .ok_or(CatalogError::CategoryNotFound(*id))?;

        Ok(match found.path.last().copied() {
            None => CategoryRef::Root(found.root),
            Some(node) => CategoryRef::Nested {
                root: found.root,
                node,
                depth: found.depth(),
            },
        })
    }

    pub fn root(&self) -> &'a Category {
        match *self {
            CategoryRef::Root(root) => root,
            CategoryRef::Nested { root, .. } => root,
        }
    }

    pub fn target(&self) -> NodeRef<'a> {
        match *self {
            CategoryRef::Root(root) => NodeRef::Root(root),
            CategoryRef::Nested { node, .. } => NodeRef::Nested(node),
        }
    }

    /// Denormalized names for an item pointing here. Intermediate ancestors
    /// between the root and the node are not part of the result.
    pub fn binding(&self) -> CategoryBinding {
        match *self {
            CategoryRef::Root(root) => CategoryBinding {
                category_id: root.id,
                category_name: root.name.clone(),
                subcategory_name: String::new(),
            },
            CategoryRef::Nested { root, node, .. } => CategoryBinding {
                category_id: node.id,
                category_name: root.name.clone(),
                subcategory_name: node.name.clone(),
            },
        }
    }

    /// The node itself followed by its descendants when `include_descendants`
    pub fn scope(&self, include_descendants: bool) -> Vec<CatalogId> {
        let target = self.target();
        let mut ids = vec![target.id()];
        if include_descendants {
            ids.extend(collect_descendant_ids(&target));
        }
        ids
    }
}

/// Names stamped onto an item on every create and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryBinding {
    pub category_id: CatalogId,
    pub category_name: String,
    pub subcategory_name: String,
}

pub fn bind_item_category(
    index: &ForestIndex<'_>,
    category_id: &CatalogId,
) -> Result<CategoryBinding, CatalogError> {
    CategoryRef::resolve(index, category_id).map(|found| found.binding())
}

/// Identifiers a product query for `node_id` covers
pub fn resolve_scope(
    index: &ForestIndex<'_>,
    node_id: &CatalogId,
    include_descendants: bool,
) -> Result<Vec<CatalogId>, CatalogError> {
    CategoryRef::resolve(index, node_id).map(|found| found.scope(include_descendants))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: Vec<Node>) -> Node {
        Node {
            id: CatalogId::new(),
            name: name.to_string(),
            image_url: None,
            subcategories: children,
        }
    }

    /// Main -> [Sub -> [SubSub -> [Deep]], Side]
    fn forest() -> Vec<Category> {
        vec![Category {
            id: CatalogId::new(),
            name: "Main".into(),
            image_url: None,
            subcategories: vec![
                node("Sub", vec![node("SubSub", vec![node("Deep", vec![])])]),
                node("Side", vec![]),
            ],
            created_at: 0,
            updated_at: 0,
        }]
    }

    #[test]
    fn test_bind_root_has_empty_subcategory() {
        let roots = forest();
        let index = ForestIndex::build(&roots);

        let binding = bind_item_category(&index, &roots[0].id).unwrap();
        assert_eq!(binding.category_id, roots[0].id);
        assert_eq!(binding.category_name, "Main");
        assert_eq!(binding.subcategory_name, "");
    }

    #[test]
    fn test_bind_nested_uses_own_name_only() {
        let roots = forest();
        let index = ForestIndex::build(&roots);

        let sub = &roots[0].subcategories[0];
        let binding = bind_item_category(&index, &sub.id).unwrap();
        assert_eq!(binding.category_name, "Main");
        assert_eq!(binding.subcategory_name, "Sub");

        let deep = &sub.subcategories[0].subcategories[0];
        let binding = bind_item_category(&index, &deep.id).unwrap();
        assert_eq!(binding.category_name, "Main");
        assert_eq!(binding.subcategory_name, "Deep");
        assert_eq!(binding.category_id, deep.id);
    }

    #[test]
    fn test_bind_unknown_category() {
        let roots = forest();
        let index = ForestIndex::build(&roots);
        let missing = CatalogId::new();
        assert!(matches!(
            bind_item_category(&index, &missing),
            Err(CatalogError::CategoryNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_resolve_reports_depth() {
        let roots = forest();
        let index = ForestIndex::build(&roots);
        let subsub = roots[0].subcategories[0].subcategories[0].id;

        match CategoryRef::resolve(&index, &subsub).unwrap() {
            CategoryRef::Nested { root, node, depth } => {
                assert_eq!(root.name, "Main");
                assert_eq!(node.name, "SubSub");
                assert_eq!(depth, 2);
            }
            other => panic!("expected nested reference, got {:?}", other),
        }
    }

    #[test]
    fn test_scope_without_descendants_is_self() {
        let roots = forest();
        let index = ForestIndex::build(&roots);
        let sub = roots[0].subcategories[0].id;

        assert_eq!(resolve_scope(&index, &sub, false).unwrap(), vec![sub]);
    }

    #[test]
    fn test_scope_with_descendants_starts_with_self() {
        let roots = forest();
        let index = ForestIndex::build(&roots);

        let scope = resolve_scope(&index, &roots[0].id, true).unwrap();
        assert_eq!(scope[0], roots[0].id);
        assert_eq!(scope.len(), 5);

        let sub = &roots[0].subcategories[0];
        let scope = resolve_scope(&index, &sub.id, true).unwrap();
        assert_eq!(scope.len(), 3);
        assert!(!scope.contains(&roots[0].subcategories[1].id));
    }

    #[test]
    fn test_scope_unknown_node() {
        let roots = forest();
        let index = ForestIndex::build(&roots);
        assert!(matches!(
            resolve_scope(&index, &CatalogId::new(), true),
            Err(CatalogError::CategoryNotFound(_))
        ));
    }
}
