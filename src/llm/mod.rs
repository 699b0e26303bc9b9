//! LLM adapter: provider abstraction + typed structured-output contract.
//!
//! Callers never see raw provider payloads. A structured call names its
//! output shape up front ([`OutputSchema`]) and gets back a value that has
//! already been validated against the Rust type it deserialises into.

pub mod anthropic;
pub mod mock;
pub mod openai;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::error::CurateError;

pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use openai::OpenAiProvider;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Named JSON shape a structured call must return.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: Value,
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// `Some` asks the provider for a structured (JSON) answer.
    pub output: Option<OutputSchema>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatResponse {
    Text(String),
    Structured(Value),
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynLlm = Arc<dyn LlmProvider>;

/// Model name + temperature for one kind of call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRole {
    pub model: String,
    pub temperature: f32,
}

/// The two call kinds the pipeline makes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRoles {
    pub classification: ModelRole,
    pub generation: ModelRole,
}

impl ModelRoles {
    pub fn from_config(cfg: &LlmConfig) -> Self {
        Self {
            classification: ModelRole {
                model: cfg.classification_model.clone(),
                temperature: cfg.classification_temperature,
            },
            generation: ModelRole {
                model: cfg.generation_model.clone(),
                temperature: cfg.generation_temperature,
            },
        }
    }
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self::from_config(&LlmConfig::default())
    }
}

// ------------------------------------------------------------
// Typed calls
// ------------------------------------------------------------

/// Structured call: the response must be structured and must deserialise
/// into `T`, otherwise [`CurateError::InvalidModelOutput`].
pub async fn invoke_structured<T: DeserializeOwned>(
    llm: &dyn LlmProvider,
    role: &ModelRole,
    system: &str,
    user: &str,
    schema: OutputSchema,
) -> Result<T> {
    let name = schema.name;
    let req = ChatRequest {
        model: role.model.clone(),
        system: system.to_string(),
        user: user.to_string(),
        temperature: role.temperature,
        max_tokens: 1024,
        output: Some(schema),
    };
    match llm.chat(req).await? {
        ChatResponse::Structured(v) => serde_json::from_value(v).map_err(|e| {
            CurateError::InvalidModelOutput(format!("{name}: {e}")).into()
        }),
        ChatResponse::Text(_) => Err(CurateError::InvalidModelOutput(format!(
            "{name}: expected structured output, got free text"
        ))
        .into()),
    }
}

/// Free-text generation call.
pub async fn invoke_text(
    llm: &dyn LlmProvider,
    role: &ModelRole,
    system: &str,
    user: &str,
) -> Result<String> {
    let req = ChatRequest {
        model: role.model.clone(),
        system: system.to_string(),
        user: user.to_string(),
        temperature: role.temperature,
        max_tokens: 4096,
        output: None,
    };
    match llm.chat(req).await? {
        ChatResponse::Text(t) => Ok(t),
        ChatResponse::Structured(v) => Ok(v.to_string()),
    }
}

// ------------------------------------------------------------
// Relevancy contract
// ------------------------------------------------------------

/// Verdict of the relevance classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relevancy {
    pub reasoning: String,
    pub relevant: bool,
}

impl Relevancy {
    pub fn schema(product_name: &str) -> OutputSchema {
        OutputSchema {
            name: "relevancy",
            description: "The relevancy of the content to the target products.",
            schema: json!({
                "type": "object",
                "properties": {
                    "reasoning": {
                        "type": "string",
                        "description": format!("Reasoning for why the webpage is or isn't relevant to {product_name}'s products.")
                    },
                    "relevant": {
                        "type": "boolean",
                        "description": format!("Whether or not the webpage is relevant to {product_name}'s products.")
                    }
                },
                "required": ["reasoning", "relevant"],
                "additionalProperties": false
            }),
        }
    }
}

// ------------------------------------------------------------
// Factory
// ------------------------------------------------------------

/// Build a provider according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock provider.
/// * Else builds the configured remote provider.
pub fn build_provider(cfg: &LlmConfig) -> Result<DynLlm> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Ok(Arc::new(MockProvider::relevant()));
    }

    match cfg.provider.as_str() {
        "anthropic" | "claude" => Ok(Arc::new(AnthropicProvider::new(
            cfg.api_key.clone(),
            cfg.base_url.clone(),
        )?)),
        "openai" => Ok(Arc::new(OpenAiProvider::new(
            cfg.api_key.clone(),
            cfg.base_url.clone(),
        )?)),
        other => anyhow::bail!("Unsupported provider in config: {other}"),
    }
}
