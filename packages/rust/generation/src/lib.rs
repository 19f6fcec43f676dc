//! OpenAI-compatible chat-completions client for description generation.
//!
//! One request per product: a system message plus the rendered
//! [`PromptTemplate`]. The first choice's message content is the new
//! description. Requests are never retried or parallelized here.

mod prompt;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use descenhancer_core::DescriptionGenerator;
use descenhancer_shared::{EnhancerError, OpenAiConfig, ProductRecord, Result};

pub use prompt::PromptTemplate;

/// User-Agent string for generation requests.
const USER_AGENT: &str = concat!("DescriptionEnhancer/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body echoed back in messages.
const MAX_ERROR_BODY: usize = 300;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Generates product descriptions through an OpenAI-compatible API.
///
/// Not `Debug`: it holds the API key.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    endpoint: Url,
    api_key: String,
    config: OpenAiConfig,
    template: PromptTemplate,
}

impl OpenAiGenerator {
    /// Build a generator from the `[openai]` config section.
    ///
    /// Loads `prompt_template` from disk when set; otherwise the built-in
    /// template is used.
    pub fn new(config: &OpenAiConfig, api_key: impl Into<String>) -> Result<Self> {
        let template = match &config.prompt_template {
            Some(path) => PromptTemplate::from_file(std::path::Path::new(path))?,
            None => PromptTemplate::default(),
        };
        Self::with_template(config, api_key, template)
    }

    /// Build a generator with an explicit prompt template.
    pub fn with_template(
        config: &OpenAiConfig,
        api_key: impl Into<String>,
        template: PromptTemplate,
    ) -> Result<Self> {
        let endpoint = completions_endpoint(&config.base_url()?)?;
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EnhancerError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            config: config.clone(),
            template,
        })
    }

    /// Model name sent with every request.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the model for a new long description of `product`.
    #[instrument(skip_all, fields(product = %product.name, model = %self.config.model))]
    pub async fn describe(&self, product: &ProductRecord) -> Result<String> {
        let prompt = self.template.render(product);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
        };

        let fail = |msg: String| EnhancerError::generation(&product.name, msg);

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| fail(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fail(format!("HTTP {status}: {}", error_detail(&body))));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| fail(format!("invalid response body: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion usage"
            );
        }

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(fail("model returned an empty description".into()));
        }
        Ok(text)
    }
}

impl DescriptionGenerator for OpenAiGenerator {
    async fn generate(&self, product: &ProductRecord) -> Result<String> {
        self.describe(product).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `<base>/chat/completions`, keeping any path prefix such as `/v1`.
fn completions_endpoint(base: &Url) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions")
        .map_err(|e| EnhancerError::config(format!("invalid completions endpoint: {e}")))
}

/// Prefer the API's own error message; fall back to a clipped raw body.
fn error_detail(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}…", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
