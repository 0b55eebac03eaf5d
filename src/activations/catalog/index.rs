//! Identifier index over a loaded category forest
//!
//! Built once per load from the nested documents, then answers lookups in a
//! hash probe plus a walk of the stored child positions. It borrows the
//! forest, so it cannot outlive or drift from the documents it describes;
//! after a mutation the caller rebuilds it.

use super::tree::{NodeRef, RootPath};
use super::types::{Category, Node};
use crate::types::CatalogId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Position of a node: which root, then child offsets from that root down
#[derive(Debug, Clone, PartialEq, Eq)]
struct Location {
    root: usize,
    path: Vec<usize>,
}

#[derive(Debug)]
pub struct ForestIndex<'a> {
    roots: &'a [Category],
    locations: HashMap<CatalogId, Location>,
    duplicates: Vec<CatalogId>,
}

impl<'a> ForestIndex<'a> {
    /// Index every root and nested node in depth-first order.
    ///
    /// Should an identifier repeat (only possible in data written before
    /// uniqueness was enforced), the first occurrence wins, matching a plain
    /// depth-first search. Repeats are recorded in [`Self::duplicates`].
    pub fn build(roots: &'a [Category]) -> Self {
        let mut index = Self {
            roots,
            locations: HashMap::new(),
            duplicates: Vec::new(),
        };

        let mut prefix = Vec::new();
        for (position, root) in roots.iter().enumerate() {
            index.record(root.id, position, &prefix);
            index.walk(&root.subcategories, position, &mut prefix);
        }

        index
    }

    fn walk(&mut self, nodes: &[Node], root: usize, prefix: &mut Vec<usize>) {
        for (position, node) in nodes.iter().enumerate() {
            prefix.push(position);
            self.record(node.id, root, prefix);
            self.walk(&node.subcategories, root, prefix);
            prefix.pop();
        }
    }

    fn record(&mut self, id: CatalogId, root: usize, path: &[usize]) {
        match self.locations.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(Location {
                    root,
                    path: path.to_vec(),
                });
            }
            Entry::Occupied(_) => self.duplicates.push(id),
        }
    }

    /// Number of distinct identifiers (roots and nested nodes)
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn contains(&self, id: &CatalogId) -> bool {
        self.locations.contains_key(id)
    }

    /// Identifiers seen more than once while indexing
    pub fn duplicates(&self) -> &[CatalogId] {
        &self.duplicates
    }

    pub fn get(&self, id: &CatalogId) -> Option<NodeRef<'a>> {
        self.root_and_path(id).map(|found| found.target())
    }

    pub fn root_and_path(&self, id: &CatalogId) -> Option<RootPath<'a>> {
        let location = self.locations.get(id)?;
        let roots: &'a [Category] = self.roots;
        let root = &roots[location.root];

        let mut path = Vec::with_capacity(location.path.len());
        let mut level: &'a [Node] = &root.subcategories;
        for &position in &location.path {
            let node = &level[position];
            path.push(node);
            level = &node.subcategories;
        }

        Some(RootPath { root, path })
    }
}
