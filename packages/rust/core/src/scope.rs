//! Index → label resolution and scope filtering.
//!
//! Everything here is pure. Re-prompting on a bad pick is the caller's job;
//! [`resolve`] only reports it as [`EnhancerError::OutOfRange`].

use descenhancer_shared::{CATEGORY_DELIMITER, EnhancerError, ProductRecord, Result, Scope};

use crate::index::IndexEntry;

/// Map a 1-based pick from the rendered listing back to its label.
pub fn resolve(entries: &[IndexEntry], chosen: usize) -> Result<&str> {
    if chosen == 0 || chosen > entries.len() {
        return Err(EnhancerError::OutOfRange {
            index: chosen,
            len: entries.len(),
        });
    }
    Ok(&entries[chosen - 1].label)
}

/// Records whose category path has `label` as one of its segments.
///
/// Matching is per segment, never substring: `"Signs"` does not match
/// `"Outdoor/Signage"`. Relative order is preserved.
pub fn filter_by<'a>(records: &'a [ProductRecord], label: &str) -> Vec<&'a ProductRecord> {
    records
        .iter()
        .filter(|r| has_segment(&r.category_path, label))
        .collect()
}

/// Records covered by `scope`, in catalog order.
pub fn select<'a>(records: &'a [ProductRecord], scope: &Scope) -> Vec<&'a ProductRecord> {
    match scope {
        Scope::All => records.iter().collect(),
        Scope::Category(label) => filter_by(records, label),
    }
}

fn has_segment(path: &str, label: &str) -> bool {
    path.split(CATEGORY_DELIMITER).any(|segment| segment == label)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
