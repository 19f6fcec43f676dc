//! Category tree builder.
//!
//! Folds every product's `/`-delimited category path into a hierarchical
//! [`CategoryTree`], sharing common prefixes. Siblings keep the order in which
//! their labels were first seen, which is what makes the indexed listing stable.

use serde::Serialize;
use tracing::{debug, instrument};

use descenhancer_shared::{CATEGORY_DELIMITER, EnhancerError, ProductRecord, Result};

/// Split a category path into its labels.
///
/// Labels are returned as-is: no trimming, no deduplication. An empty path is
/// rejected; every product is expected to carry one.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    if path.is_empty() {
        return Err(EnhancerError::invalid_path("category path is empty"));
    }
    Ok(path.split(CATEGORY_DELIMITER).collect())
}

/// One label's position in the tree. Owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryNode {
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            children: Vec::new(),
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::count).sum::<usize>()
    }
}

/// Hierarchy of category labels. The root is implicit and unlabeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
}

impl CategoryTree {
    /// Build the tree from every record's category path, in input order.
    ///
    /// Fails on the first record with an empty path; no partial tree is returned.
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build(records: &[ProductRecord]) -> Result<Self> {
        let mut tree = Self::default();

        for record in records {
            let labels = split_path(&record.category_path).map_err(|_| {
                EnhancerError::invalid_path(format!(
                    "product '{}' has an empty category path",
                    record.name
                ))
            })?;
            tree.insert(&labels);
        }

        debug!(
            top_level = tree.roots.len(),
            nodes = tree.node_count(),
            "category tree built"
        );
        Ok(tree)
    }

    /// Top-level categories in first-seen order.
    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Total number of labeled nodes (the implicit root is not counted).
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(CategoryNode::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    fn insert(&mut self, labels: &[&str]) {
        let mut level = &mut self.roots;
        for label in labels {
            level = &mut child_or_insert(level, label).children;
        }
    }
}

/// Find `label` among `children`, appending a fresh node if it is not there yet.
fn child_or_insert<'a>(children: &'a mut Vec<CategoryNode>, label: &str) -> &'a mut CategoryNode {
    let pos = match children.iter().position(|c| c.label == label) {
        Some(pos) => pos,
        None => {
            children.push(CategoryNode::new(label));
            children.len() - 1
        }
    };
    &mut children[pos]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, path: &str) -> ProductRecord {
        ProductRecord::new(name, "short", "long", path)
    }

    fn labels(nodes: &[CategoryNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.label.as_str()).collect()
    }

    #[test]
    fn split_path_keeps_segments_verbatim() {
        assert_eq!(split_path("Outdoor/Signs").unwrap(), vec!["Outdoor", "Signs"]);
        assert_eq!(split_path("Single").unwrap(), vec!["Single"]);
        assert_eq!(split_path(" Outdoor / Signs").unwrap(), vec![" Outdoor ", " Signs"]);
        assert_eq!(split_path("a//a").unwrap(), vec!["a", "", "a"]);
    }

    #[test]
    fn split_path_rejects_empty() {
        let err = split_path("").unwrap_err();
        assert!(matches!(err, EnhancerError::InvalidPath { .. }));
    }

    #[test]
    fn build_shares_prefixes() {
        let records = vec![
            product("a", "Outdoor/Signs"),
            product("b", "Outdoor/Fences"),
            product("c", "Indoor/Signs"),
        ];

        let tree = CategoryTree::build(&records).unwrap();
        assert_eq!(labels(tree.roots()), vec!["Outdoor", "Indoor"]);
        assert_eq!(labels(&tree.roots()[0].children), vec!["Signs", "Fences"]);
        assert_eq!(labels(&tree.roots()[1].children), vec!["Signs"]);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn build_is_idempotent_for_repeated_records() {
        let once = vec![product("a", "Outdoor/Signs/Wood")];
        let twice = vec![
            product("a", "Outdoor/Signs/Wood"),
            product("a", "Outdoor/Signs/Wood"),
            product("b", "Outdoor/Signs"),
        ];

        assert_eq!(
            CategoryTree::build(&once).unwrap(),
            CategoryTree::build(&twice).unwrap()
        );
    }

    #[test]
    fn labels_are_scoped_to_their_parent() {
        let records = vec![product("a", "Outdoor/Signs"), product("b", "Signs/Outdoor")];

        let tree = CategoryTree::build(&records).unwrap();
        assert_eq!(labels(tree.roots()), vec!["Outdoor", "Signs"]);
        assert_eq!(labels(&tree.roots()[0].children), vec!["Signs"]);
        assert_eq!(labels(&tree.roots()[1].children), vec!["Outdoor"]);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn build_aborts_on_empty_path() {
        let records = vec![product("ok", "Outdoor/Signs"), product("broken", "")];

        let err = CategoryTree::build(&records).unwrap_err();
        assert!(matches!(err, EnhancerError::InvalidPath { .. }));
        assert_eq!(
            err.to_string(),
            "invalid category path: product 'broken' has an empty category path"
        );
    }

    #[test]
    fn empty_catalog_gives_empty_tree() {
        let tree = CategoryTree::build(&[]).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
    }

    #[test]
    fn tree_serializes_as_nested_labels() {
        let tree = CategoryTree::build(&[product("a", "Outdoor/Signs")]).unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"[{"label":"Outdoor","children":[{"label":"Signs"}]}]"#);
    }
}
