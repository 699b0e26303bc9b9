// src/sources/latent_space.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Datelike, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::sync::Arc;
use tracing::{info, warn};

use super::{record_candidates, unique_items, SourceLoader};
use crate::store::{remember, DedupStore, SeenSet, SourceKey};

const SITEMAP_LINK_CLASS: &str = "sitemap-link";

/// Scrapes the yearly sitemap page and returns only links not handed out
/// before. The union of old and new links is persisted on every run.
pub struct LatentSpaceLoader {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn DedupStore>,
}

impl LatentSpaceLoader {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn DedupStore>) -> Result<Self> {
        Ok(Self {
            http: crate::http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn sitemap_url(&self, year: i32) -> String {
        format!("{}/sitemap/{year}", self.base_url)
    }

    async fn fetch_sitemap(&self, url: &str) -> Result<String> {
        self.http
            .get(url)
            .send()
            .await
            .context("latent space sitemap get")?
            .error_for_status()
            .context("latent space sitemap non-2xx")?
            .text()
            .await
            .context("latent space sitemap body")
    }
}

#[async_trait]
impl SourceLoader for LatentSpaceLoader {
    async fn load(&self) -> Result<Vec<String>> {
        let url = self.sitemap_url(Utc::now().year());
        let html = self.fetch_sitemap(&url).await?;
        let links = extract_sitemap_links(&html);

        let processed = SeenSet::from(self.store.get(SourceKey::LatentSpaceLinks).await?);
        let fresh = unique_items(&processed, links);
        remember(self.store.as_ref(), SourceKey::LatentSpaceLinks, &fresh).await?;

        record_candidates(self.name(), fresh.len());
        info!(target: "curate", sitemap = %url, fresh = fresh.len(), "latent space links discovered");
        Ok(fresh)
    }

    fn name(&self) -> &'static str {
        "latent_space"
    }
}

/// `href`s of every `<a class="sitemap-link">` on the page, in document order.
///
/// The page is HTML, not XML: end-tag checks are off and attributes are read
/// in HTML mode. Scanning stops at the first tokenizer error, keeping what
/// was found up to that point.
pub fn extract_sitemap_links(html: &str) -> Vec<String> {
    let mut reader = Reader::from_str(html);
    {
        let cfg = reader.config_mut();
        cfg.check_end_names = false;
        cfg.allow_unmatched_ends = true;
    }

    let mut out = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if !e.name().as_ref().eq_ignore_ascii_case(b"a") {
                    continue;
                }
                let mut is_sitemap_link = false;
                let mut href = None;
                for attr in e.html_attributes().with_checks(false).flatten() {
                    let value = String::from_utf8_lossy(&attr.value).to_string();
                    match attr.key.as_ref() {
                        b"class" => {
                            is_sitemap_link = value
                                .split_ascii_whitespace()
                                .any(|c| c == SITEMAP_LINK_CLASS);
                        }
                        b"href" => {
                            href = Some(html_escape::decode_html_entities(&value).trim().to_string());
                        }
                        _ => {}
                    }
                }
                if let (true, Some(h)) = (is_sitemap_link, href) {
                    if !h.is_empty() {
                        out.push(h);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(target: "curate", error = ?e, kept = out.len(), "sitemap scan stopped early");
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_only_sitemap_links() {
        let html = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>Sitemap</title></head>
<body>
  <a href="/about">About</a>
  <div class="sitemap-content">
    <a class="sitemap-link" href="https://www.latent.space/p/agents">Agents</a>
    <br>
    <a href="https://www.latent.space/p/evals?a=1&amp;b=2" class="x sitemap-link">Evals</a>
  </div>
</body></html>"#;
        assert_eq!(
            extract_sitemap_links(html),
            vec![
                "https://www.latent.space/p/agents",
                "https://www.latent.space/p/evals?a=1&b=2",
            ]
        );
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(extract_sitemap_links("").is_empty());
    }
}
