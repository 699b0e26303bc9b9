// src/llm/anthropic.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ChatRequest, ChatResponse, LlmProvider};
use crate::error::CurateError;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API. Structured output is a forced tool call whose
/// input schema is the requested [`super::OutputSchema`].
pub struct AnthropicProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CurateError::MissingCredential("ANTHROPIC_API_KEY").into());
        }
        Ok(Self {
            http: crate::http_client()?,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Tool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a Value,
}

#[derive(Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    system: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    content: Vec<Block>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Block {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let (tools, tool_choice) = match &req.output {
            Some(schema) => (
                vec![Tool {
                    name: schema.name,
                    description: schema.description,
                    input_schema: &schema.schema,
                }],
                Some(ToolChoice {
                    kind: "tool",
                    name: schema.name,
                }),
            ),
            None => (Vec::new(), None),
        };

        let body = Req {
            model: &req.model,
            system: &req.system,
            messages: vec![Msg {
                role: "user",
                content: &req.user,
            }],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            tools,
            tool_choice,
        };

        let resp: Resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .context("anthropic post")?
            .error_for_status()
            .context("anthropic non-2xx")?
            .json()
            .await
            .context("anthropic response body")?;

        if let Some(schema) = &req.output {
            return resp
                .content
                .into_iter()
                .find_map(|b| match b {
                    Block::ToolUse { name, input } if name == schema.name => Some(input),
                    _ => None,
                })
                .map(ChatResponse::Structured)
                .ok_or_else(|| {
                    CurateError::InvalidModelOutput(format!(
                        "{}: no tool_use block in response",
                        schema.name
                    ))
                    .into()
                });
        }

        let text = resp
            .content
            .into_iter()
            .filter_map(|b| match b {
                Block::Text { text } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(anyhow!("anthropic returned no text content"));
        }
        Ok(ChatResponse::Text(text))
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}
