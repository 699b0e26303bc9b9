// tests/common/mod.rs
//
// In-process fakes for every external collaborator of the pipeline.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;

use content_curator::config::ProductConfig;
use content_curator::content::PageLoader;
use content_curator::github::{RepoMetadata, RepoSearch};
use content_curator::llm::{ChatRequest, ChatResponse, LlmProvider, ModelRoles};
use content_curator::sources::{ChannelMessageSource, HistoryWindow, SlackMessage, SourceLoader};
use content_curator::verify::RelevanceVerifier;

/// Search API fake: per-query canned results, a default for unknown queries,
/// and queries that fail.
#[derive(Default)]
pub struct FakeSearch {
    pub by_query: HashMap<String, Vec<String>>,
    pub default: Vec<String>,
    pub failing: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSearch {
    pub fn returning(urls: &[&str]) -> Self {
        Self {
            default: urls.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RepoSearch for FakeSearch {
    async fn search_repositories(&self, query: &str) -> Result<Vec<String>> {
        self.calls.lock().unwrap().push(query.to_string());
        if self.failing.iter().any(|q| q == query) {
            return Err(anyhow!("search API 502 for {query}"));
        }
        Ok(self
            .by_query
            .get(query)
            .cloned()
            .unwrap_or_else(|| self.default.clone()))
    }
}

/// Page fake: URL → content; unknown URLs fail.
#[derive(Default)]
pub struct FakePages {
    pub pages: HashMap<String, String>,
    pub loads: Mutex<Vec<String>>,
}

impl FakePages {
    pub fn with(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(u, c)| (u.to_string(), c.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageLoader for FakePages {
    async fn load(&self, url: &str) -> Result<String> {
        self.loads.lock().unwrap().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("crawl failed for {url}"))
    }
}

/// Classifier fake: relevant iff the page mentions `keyword`.
pub struct KeywordClassifier {
    pub keyword: &'static str,
    pub calls: AtomicUsize,
}

impl KeywordClassifier {
    pub fn new(keyword: &'static str) -> Self {
        Self {
            keyword,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for KeywordClassifier {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let relevant = req.user.to_lowercase().contains(self.keyword);
        Ok(ChatResponse::Structured(json!({
            "reasoning": format!("mentions {}: {relevant}", self.keyword),
            "relevant": relevant
        })))
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Star-count fake keyed by "owner/repo"; unknown repos fail.
#[derive(Default)]
pub struct FakeStars {
    pub stars: HashMap<String, u64>,
}

impl FakeStars {
    pub fn with(stars: &[(&str, u64)]) -> Self {
        Self {
            stars: stars.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }
}

#[async_trait]
impl RepoMetadata for FakeStars {
    async fn stargazers(&self, owner: &str, repo: &str) -> Result<u64> {
        self.stars
            .get(&format!("{owner}/{repo}"))
            .copied()
            .ok_or_else(|| anyhow!("404 for {owner}/{repo}"))
    }
}

/// Loader fake that returns a fixed result.
pub struct FixedLoader {
    pub name: &'static str,
    pub result: Mutex<Option<Result<Vec<String>>>>,
}

impl FixedLoader {
    pub fn ok(name: &'static str, links: &[&str]) -> Self {
        Self {
            name,
            result: Mutex::new(Some(Ok(links.iter().map(|s| s.to_string()).collect()))),
        }
    }

    pub fn failing(name: &'static str, err: anyhow::Error) -> Self {
        Self {
            name,
            result: Mutex::new(Some(Err(err))),
        }
    }
}

#[async_trait]
impl SourceLoader for FixedLoader {
    async fn load(&self) -> Result<Vec<String>> {
        self.result
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Channel fake that counts calls.
#[derive(Default)]
pub struct FakeChannel {
    pub messages: Vec<SlackMessage>,
    pub calls: Mutex<Vec<(String, HistoryWindow)>>,
}

impl FakeChannel {
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            messages: texts
                .iter()
                .enumerate()
                .map(|(i, t)| SlackMessage {
                    ts: format!("1700000000.{i:06}"),
                    text: t.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChannelMessageSource for FakeChannel {
    async fn channel_messages(
        &self,
        channel_id: &str,
        window: &HistoryWindow,
    ) -> Result<Vec<SlackMessage>> {
        self.calls
            .lock()
            .unwrap()
            .push((channel_id.to_string(), window.clone()));
        Ok(self.messages.clone())
    }
}

pub fn verifier(pages: Arc<FakePages>, llm: Arc<dyn LlmProvider>) -> RelevanceVerifier {
    RelevanceVerifier::new(
        pages,
        llm,
        ModelRoles::default().classification,
        &ProductConfig::default(),
    )
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
