//! Core domain types for DescriptionEnhancer.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current schema version for the run manifest format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Separator between labels in a category path (`Outdoor/Signs`).
pub const CATEGORY_DELIMITER: char = '/';

// ---------------------------------------------------------------------------
// ProductRecord
// ---------------------------------------------------------------------------

/// One row of the product catalog.
///
/// Field names follow the catalog export: the long description lives in the
/// `description` column and the category path in `categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product display name.
    pub name: String,
    /// Short marketing blurb.
    #[serde(default)]
    pub short_description: String,
    /// Current long-form description.
    #[serde(rename = "description", default)]
    pub long_description: String,
    /// `/`-joined root-to-leaf category labels.
    #[serde(rename = "categories", default)]
    pub category_path: String,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        short_description: impl Into<String>,
        long_description: impl Into<String>,
        category_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_description: short_description.into(),
            long_description: long_description.into(),
            category_path: category_path.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Which records a batch run covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum Scope {
    /// Every record in the catalog.
    All,
    /// Records whose category path has this label as one of its segments.
    Category(String),
}

impl Scope {
    /// The category label, if this is a category scope.
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Category(label) => Some(label),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all products"),
            Self::Category(label) => write!(f, "category '{label}'"),
        }
    }
}

// ---------------------------------------------------------------------------
// EnhancedDescription
// ---------------------------------------------------------------------------

/// One output row: the product name and its regenerated description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancedDescription {
    pub name: String,
    pub enhanced_description: String,
}

// ---------------------------------------------------------------------------
// RunId / RunManifest
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one batch run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Summary of a finished batch run, written next to the output CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema version for forward compatibility.
    pub schema_version: u32,
    /// Unique identifier for this run.
    pub id: RunId,
    /// Which records were selected.
    pub scope: Scope,
    /// Catalog file the records were read from.
    pub source_path: String,
    /// CSV file the enhanced descriptions were written to.
    pub output_path: String,
    /// Model that generated the descriptions.
    pub model: String,
    /// Number of records enhanced.
    pub record_count: usize,
    /// Tool version that produced this run.
    pub tool_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let parsed: RunId = id.to_string().parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn product_record_uses_catalog_column_names() {
        let record = ProductRecord::new("Hito", "short", "long", "Outdoor/Signs");
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["description"], "long");
        assert_eq!(json["categories"], "Outdoor/Signs");
        assert!(json.get("long_description").is_none());
    }

    #[test]
    fn scope_label_and_display() {
        assert_eq!(Scope::All.label(), None);
        assert_eq!(Scope::All.to_string(), "all products");

        let scope = Scope::Category("Signs".into());
        assert_eq!(scope.label(), Some("Signs"));
        assert_eq!(scope.to_string(), "category 'Signs'");
    }

    #[test]
    fn manifest_serialization() {
        let manifest = RunManifest {
            schema_version: CURRENT_SCHEMA_VERSION,
            id: RunId::new(),
            scope: Scope::Category("Fences".into()),
            source_path: "data/products.csv".into(),
            output_path: "data/enhanced_products.csv".into(),
            model: "gpt-4o".into(),
            record_count: 2,
            tool_version: "0.1.0".into(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&manifest).expect("serialize");
        assert!(json.contains(r#""kind": "category""#));
        assert!(json.contains(r#""label": "Fences""#));

        let parsed: RunManifest = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(parsed.scope, Scope::Category("Fences".into()));
        assert_eq!(parsed.record_count, 2);
    }
}
