//! Shared types, error model, and configuration for DescriptionEnhancer.
//!
//! This crate is the foundation depended on by all other DescriptionEnhancer crates.
//! It provides:
//! - [`EnhancerError`]: the unified error type
//! - Domain types ([`ProductRecord`], [`Scope`], [`EnhancedDescription`], [`RunManifest`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OpenAiConfig, api_key, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_api_key,
};
pub use error::{EnhancerError, Result};
pub use types::{
    CATEGORY_DELIMITER, CURRENT_SCHEMA_VERSION, EnhancedDescription, ProductRecord, RunId,
    RunManifest, Scope,
};
