//! Depth-first indexing of the category tree.
//!
//! The operator picks a category by number, so the numbering shown on screen
//! and the numbering used to resolve the pick must come from the same
//! traversal. [`flatten`] is that traversal; [`render`] only formats its output.

use std::fmt::Write as _;

use serde::Serialize;

use descenhancer_shared::{ProductRecord, Result};

use crate::category::{CategoryNode, CategoryTree};
use crate::scope;

/// One addressable line of the category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    /// 1-based position in DFS pre-order.
    pub index: usize,
    pub label: String,
    /// 0 for top-level categories.
    pub depth: usize,
}

/// Flatten the tree in DFS pre-order, numbering nodes from 1.
///
/// A node is numbered before any of its children; children are visited in
/// insertion order.
pub fn flatten(tree: &CategoryTree) -> Vec<IndexEntry> {
    let mut entries = Vec::with_capacity(tree.node_count());
    visit(tree.roots(), 0, &mut entries);
    entries
}

fn visit(nodes: &[CategoryNode], depth: usize, entries: &mut Vec<IndexEntry>) {
    for node in nodes {
        entries.push(IndexEntry {
            index: entries.len() + 1,
            label: node.label.clone(),
            depth,
        });
        visit(&node.children, depth + 1, entries);
    }
}

/// Format entries as the numbered listing shown to the operator.
///
/// One line per entry, indented two spaces per level: `"2.   Signs"`.
pub fn render(entries: &[IndexEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(
            out,
            "{}. {}{}",
            entry.index,
            "  ".repeat(entry.depth),
            entry.label
        );
    }
    out
}

/// A tree and its flattened listing, built together for one selection.
///
/// Rebuilt from the records on every "by category" action; nothing is cached.
#[derive(Debug, Clone)]
pub struct CategoryIndex {
    tree: CategoryTree,
    entries: Vec<IndexEntry>,
}

impl CategoryIndex {
    pub fn build(records: &[ProductRecord]) -> Result<Self> {
        let tree = CategoryTree::build(records)?;
        let entries = flatten(&tree);
        Ok(Self { tree, entries })
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        render(&self.entries)
    }

    /// Resolve an operator's pick to its category label.
    pub fn resolve(&self, chosen: usize) -> Result<&str> {
        scope::resolve(&self.entries, chosen)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
