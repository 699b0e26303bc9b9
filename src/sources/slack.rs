// src/sources/slack.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::record_candidates;
use crate::config::SlackConfig;
use crate::error::CurateError;
use crate::store::SeenSet;

const DEFAULT_SLACK_API: &str = "https://slack.com/api";
const PAGE_SIZE: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryWindow {
    pub max_messages: Option<usize>,
    pub max_hours_history: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackMessage {
    pub ts: String,
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub reply_count: Option<u32>,
}

#[async_trait]
pub trait ChannelMessageSource: Send + Sync {
    /// Most recent messages of `channel_id`, newest first, bounded by `window`.
    async fn channel_messages(
        &self,
        channel_id: &str,
        window: &HistoryWindow,
    ) -> Result<Vec<SlackMessage>>;
}

// ------------------------------------------------------------
// Web API client
// ------------------------------------------------------------

pub struct SlackClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl SlackClient {
    pub fn new(token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(CurateError::MissingCredential("SLACK_BOT_TOKEN").into());
        }
        Ok(Self {
            http: crate::http_client()?,
            token,
            base_url: DEFAULT_SLACK_API.to_string(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var("SLACK_BOT_TOKEN")
            .map_err(|_| CurateError::MissingCredential("SLACK_BOT_TOKEN"))?;
        Self::new(token)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Deserialize)]
struct HistoryResp {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<SlackMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[async_trait]
impl ChannelMessageSource for SlackClient {
    async fn channel_messages(
        &self,
        channel_id: &str,
        window: &HistoryWindow,
    ) -> Result<Vec<SlackMessage>> {
        let oldest = window.max_hours_history.map(|h| {
            let secs = chrono::Utc::now().timestamp() - (h as i64).saturating_mul(3600);
            format!("{}.000000", secs.max(0))
        });

        let mut out: Vec<SlackMessage> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let remaining = window.max_messages.map(|m| m.saturating_sub(out.len()));
            if remaining == Some(0) {
                break;
            }
            let limit = remaining.unwrap_or(PAGE_SIZE).min(PAGE_SIZE).to_string();

            let mut query: Vec<(&str, &str)> =
                vec![("channel", channel_id), ("limit", limit.as_str())];
            if let Some(o) = &oldest {
                query.push(("oldest", o.as_str()));
            }
            if let Some(c) = &cursor {
                query.push(("cursor", c.as_str()));
            }

            let resp: HistoryResp = self
                .http
                .get(format!("{}/conversations.history", self.base_url))
                .bearer_auth(&self.token)
                .query(&query)
                .send()
                .await
                .context("slack history get")?
                .error_for_status()
                .context("slack history non-2xx")?
                .json()
                .await
                .context("slack history body")?;

            if !resp.ok {
                bail!(
                    "slack conversations.history failed: {}",
                    resp.error.unwrap_or_else(|| "unknown error".into())
                );
            }
            out.extend(resp.messages);

            cursor = resp
                .response_metadata
                .map(|m| m.next_cursor)
                .filter(|c| !c.is_empty());
            if cursor.is_none() {
                break;
            }
        }

        if let Some(max) = window.max_messages {
            out.truncate(max);
        }
        Ok(out)
    }
}

// ------------------------------------------------------------
// Loader
// ------------------------------------------------------------

/// Collects links shared in a Slack channel.
pub struct SlackLoader {
    source: Option<Arc<dyn ChannelMessageSource>>,
    config: SlackConfig,
}

impl SlackLoader {
    pub fn new(source: Arc<dyn ChannelMessageSource>, config: SlackConfig) -> Self {
        Self {
            source: Some(source),
            config,
        }
    }

    /// Loader without a channel client, for `skip_ingest` runs that only
    /// pass supplied links through. Needs no Slack token.
    pub fn links_only(config: SlackConfig) -> Self {
        Self {
            source: None,
            config,
        }
    }

    /// With `skip_ingest`, returns `existing_links` unchanged (and fails when
    /// there are none) without touching the network. Otherwise reads the
    /// configured channel and flattens every message's URLs.
    pub async fn load(&self, existing_links: &[String]) -> Result<Vec<String>> {
        if self.config.skip_ingest {
            if existing_links.is_empty() {
                return Err(CurateError::MissingState("can not skip ingest with no links").into());
            }
            return Ok(existing_links.to_vec());
        }

        let channel_id = self
            .config
            .channel_id
            .as_deref()
            .ok_or(CurateError::MissingConfig("slack channel id"))?;

        let window = HistoryWindow {
            max_messages: self.config.max_messages,
            max_hours_history: self.config.max_hours_history(),
        };
        let source = self
            .source
            .as_ref()
            .ok_or(CurateError::MissingCredential("SLACK_BOT_TOKEN"))?;
        let messages = source
            .channel_messages(channel_id, &window)
            .await
            .context("fetching slack messages")?;

        let links: Vec<String> = messages
            .iter()
            .flat_map(|m| extract_urls_from_slack_text(&m.text))
            .collect();

        record_candidates("slack", links.len());
        info!(target: "slack", messages = messages.len(), links = links.len(), "slack links ingested");
        Ok(links)
    }
}

/// URLs in a Slack message body.
///
/// Slack wraps links as `<url>` or `<url|label>`; user, channel and special
/// mentions (`<@U..>`, `<#C..>`, `<!here>`) and `mailto:` links are ignored.
/// Plain URLs outside angle brackets are picked up too. Entities such as
/// `&amp;` are decoded. Repeats within one message are dropped.
pub fn extract_urls_from_slack_text(text: &str) -> Vec<String> {
    static RE_WRAPPED: OnceCell<Regex> = OnceCell::new();
    static RE_BARE: OnceCell<Regex> = OnceCell::new();
    let re_wrapped =
        RE_WRAPPED.get_or_init(|| Regex::new(r"<(https?://[^|>\s]+)(?:\|[^>]*)?>").unwrap());
    let re_bare = RE_BARE.get_or_init(|| Regex::new(r"https?://[^\s<>|]+").unwrap());

    let mut found = SeenSet::new();
    for cap in re_wrapped.captures_iter(text) {
        found.insert(html_escape::decode_html_entities(&cap[1]).to_string());
    }
    let stripped = re_wrapped.replace_all(text, " ");
    for m in re_bare.find_iter(&stripped) {
        let url = m.as_str().trim_end_matches(['.', ',', ')', '!', '?', ';', ':']);
        found.insert(html_escape::decode_html_entities(url).to_string());
    }
    found.into_vec()
}
