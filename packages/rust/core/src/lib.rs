//! Category selection and batch enhancement for DescriptionEnhancer.
//!
//! This crate turns a flat product catalog into an indexed category tree,
//! resolves an operator's pick into a [`descenhancer_shared::Scope`], and runs
//! the selected products through a description generator (`enhance`).

pub mod category;
pub mod enhance;
pub mod index;
pub mod pipeline;
pub mod scope;

pub use category::{CategoryNode, CategoryTree, split_path};
pub use enhance::{DescriptionGenerator, EnhanceProgress, SilentEnhanceProgress, run_batch};
pub use index::{CategoryIndex, IndexEntry, flatten, render};
pub use scope::{filter_by, resolve, select};
