//! Application configuration for DescriptionEnhancer.
//!
//! User config lives at `~/.descenhancer/descenhancer.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EnhancerError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "descenhancer.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".descenhancer";

// ---------------------------------------------------------------------------
// Config structs (matching descenhancer.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Text-generation service settings.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Product catalog CSV to read.
    #[serde(default = "default_products_path")]
    pub products_path: String,

    /// Where enhanced descriptions are written.
    #[serde(default = "default_output_path")]
    pub output_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            products_path: default_products_path(),
            output_path: default_output_path(),
        }
    }
}

fn default_products_path() -> String {
    "data/products.csv".into()
}
fn default_output_path() -> String {
    "data/enhanced_products.csv".into()
}

/// `[openai]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for description generation.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_sampling")]
    pub temperature: f64,

    #[serde(default = "default_sampling")]
    pub top_p: f64,

    #[serde(default)]
    pub frequency_penalty: f64,

    #[serde(default)]
    pub presence_penalty: f64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// System message sent ahead of every prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Optional file overriding the built-in prompt template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_sampling(),
            top_p: default_sampling(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            timeout_secs: default_timeout_secs(),
            system_prompt: default_system_prompt(),
            prompt_template: None,
        }
    }
}

impl OpenAiConfig {
    /// Parse and check the configured base URL.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            EnhancerError::config(format!("invalid openai.base_url '{}': {e}", self.base_url))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(EnhancerError::config(format!(
                "openai.base_url must be http or https, got '{other}'"
            ))),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_max_tokens() -> u32 {
    450
}
fn default_sampling() -> f64 {
    0.6
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_system_prompt() -> String {
    "You are a helpful assistant.".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.descenhancer/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| EnhancerError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.descenhancer/descenhancer.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EnhancerError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        EnhancerError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.openai.base_url()?;

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| EnhancerError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| EnhancerError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| EnhancerError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    api_key(config).map(|_| ())
}

/// Read the API key from the env var named in config.
pub fn api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(EnhancerError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}
