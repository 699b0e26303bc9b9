// src/content.rs
//! Page content loading (full crawl of a link, rendered as markdown).

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::error::CurateError;

#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Full crawled text content of `url`.
    async fn load(&self, url: &str) -> Result<String>;
}

const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev";

/// Firecrawl crawl-mode loader: starts a crawl job and polls until it
/// completes, then joins every crawled page's markdown.
#[derive(Clone)]
pub struct FirecrawlLoader {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    page_limit: u32,
    poll_interval: Duration,
    max_polls: u32,
}

impl FirecrawlLoader {
    pub fn new(api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(CurateError::MissingCredential("FIRECRAWL_API_KEY").into());
        }
        Ok(Self {
            http: crate::http_client()?,
            api_key,
            base_url: DEFAULT_FIRECRAWL_URL.to_string(),
            page_limit: 10,
            poll_interval: Duration::from_secs(2),
            max_polls: 90,
        })
    }

    pub fn from_env() -> Result<Self> {
        let key = std::env::var("FIRECRAWL_API_KEY")
            .map_err(|_| CurateError::MissingCredential("FIRECRAWL_API_KEY"))?;
        Self::new(key)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls.max(1);
        self
    }

    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.max(1);
        self
    }
}

#[derive(Deserialize)]
struct StartResp {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct StatusResp {
    status: String,
    #[serde(default)]
    data: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    markdown: Option<String>,
}

#[async_trait]
impl PageLoader for FirecrawlLoader {
    async fn load(&self, url: &str) -> Result<String> {
        let started: StartResp = self
            .http
            .post(format!("{}/v1/crawl", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "url": url,
                "limit": self.page_limit,
                "scrapeOptions": { "formats": ["markdown"] }
            }))
            .send()
            .await
            .context("firecrawl crawl post")?
            .error_for_status()
            .context("firecrawl crawl non-2xx")?
            .json()
            .await
            .context("firecrawl crawl body")?;

        let id = match (started.success, started.id) {
            (true, Some(id)) => id,
            (_, _) => bail!(
                "firecrawl refused crawl of {url}: {}",
                started.error.unwrap_or_else(|| "no job id".into())
            ),
        };

        for _ in 0..self.max_polls {
            let status: StatusResp = self
                .http
                .get(format!("{}/v1/crawl/{id}", self.base_url))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .context("firecrawl status get")?
                .error_for_status()
                .context("firecrawl status non-2xx")?
                .json()
                .await
                .context("firecrawl status body")?;

            match status.status.as_str() {
                "completed" => {
                    return Ok(status
                        .data
                        .into_iter()
                        .filter_map(|p| p.markdown)
                        .collect::<Vec<_>>()
                        .join("\n"));
                }
                "failed" | "cancelled" => bail!("firecrawl crawl {id} for {url} {}", status.status),
                _ => tokio::time::sleep(self.poll_interval).await,
            }
        }

        Err(anyhow!(
            "firecrawl crawl {id} for {url} did not finish after {} polls",
            self.max_polls
        ))
    }
}
