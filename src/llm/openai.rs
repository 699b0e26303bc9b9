// src/llm/openai.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ChatRequest, ChatResponse, LlmProvider};
use crate::error::CurateError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI Chat Completions. Structured output goes through
/// `response_format: json_schema` in strict mode.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CurateError::MissingCredential("OPENAI_API_KEY").into());
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
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        let response_format = req.output.as_ref().map(|schema| {
            json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name,
                    "description": schema.description,
                    "schema": schema.schema,
                    "strict": true
                }
            })
        });

        let body = Req {
            model: &req.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: &req.system,
                },
                Msg {
                    role: "user",
                    content: &req.user,
                },
            ],
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            response_format,
        };

        let resp: Resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai post")?
            .error_for_status()
            .context("openai non-2xx")?
            .json()
            .await
            .context("openai response body")?;

        let content = resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| anyhow!("openai returned no message content"))?;

        match &req.output {
            Some(schema) => serde_json::from_str::<Value>(&content)
                .map(ChatResponse::Structured)
                .map_err(|e| {
                    CurateError::InvalidModelOutput(format!("{}: {e}", schema.name)).into()
                }),
            None => Ok(ChatResponse::Text(content)),
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
