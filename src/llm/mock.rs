// src/llm/mock.rs
use std::collections::VecDeque;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;

use super::{ChatRequest, ChatResponse, LlmProvider};

/// Offline provider for tests and `AI_TEST_MODE=mock` runs.
///
/// In scripted mode each call pops the next queued response and fails once
/// the queue is empty. Otherwise it answers deterministically: structured
/// calls get `{"relevant": true}`, text calls echo the user message inside a
/// `<post>` section. Every request is recorded.
pub struct MockProvider {
    script: Option<Mutex<VecDeque<ChatResponse>>>,
    seen: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    pub fn relevant() -> Self {
        Self {
            script: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn scripted(responses: Vec<ChatResponse>) -> Self {
        Self {
            script: Some(Mutex::new(responses.into())),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.seen.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        if let Ok(mut g) = self.seen.lock() {
            g.push(req.clone());
        }

        if let Some(script) = &self.script {
            let mut q = script.lock().map_err(|_| anyhow!("mock script poisoned"))?;
            return q.pop_front().ok_or_else(|| anyhow!("mock script exhausted"));
        }

        Ok(match req.output {
            Some(_) => ChatResponse::Structured(json!({
                "reasoning": "mock provider accepts everything",
                "relevant": true
            })),
            None => {
                let echoed: String = req.user.chars().take(280).collect();
                ChatResponse::Text(format!(
                    "<thinking>mock provider</thinking>\n<post>{echoed}</post>"
                ))
            }
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
