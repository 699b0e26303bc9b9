// src/github.rs
//! Thin GitHub REST client: repository search + repository metadata.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CurateError;

const DEFAULT_API_URL: &str = "https://api.github.com";

#[async_trait]
pub trait RepoSearch: Send + Sync {
    /// Repository html URLs matching `query`, most-starred first.
    async fn search_repositories(&self, query: &str) -> Result<Vec<String>>;
}

#[async_trait]
pub trait RepoMetadata: Send + Sync {
    async fn stargazers(&self, owner: &str, repo: &str) -> Result<u64>;
}

#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    token: String,
    base_url: String,
    per_page: u8,
}

impl GithubClient {
    pub fn new(token: String) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(CurateError::MissingCredential("GITHUB_TOKEN").into());
        }
        Ok(Self {
            http: crate::http_client()?,
            token,
            base_url: DEFAULT_API_URL.to_string(),
            per_page: 30,
        })
    }

    /// Fails with [`CurateError::MissingCredential`] before any network call
    /// when `GITHUB_TOKEN` is unset.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .map_err(|_| CurateError::MissingCredential("GITHUB_TOKEN"))?;
        Self::new(token)
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }
}

#[derive(Deserialize)]
struct SearchResp {
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    html_url: String,
}

#[derive(Deserialize)]
struct RepoResp {
    stargazers_count: Option<u64>,
}

#[async_trait]
impl RepoSearch for GithubClient {
    async fn search_repositories(&self, query: &str) -> Result<Vec<String>> {
        let per_page = self.per_page.to_string();
        let resp: SearchResp = self
            .http
            .get(format!("{}/search/repositories", self.base_url))
            .bearer_auth(&self.token)
            .header("accept", "application/vnd.github+json")
            .query(&[
                ("q", query),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .context("github search get")?
            .error_for_status()
            .context("github search non-2xx")?
            .json()
            .await
            .context("github search body")?;
        Ok(resp.items.into_iter().map(|i| i.html_url).collect())
    }
}

#[async_trait]
impl RepoMetadata for GithubClient {
    async fn stargazers(&self, owner: &str, repo: &str) -> Result<u64> {
        let resp: RepoResp = self
            .http
            .get(format!("{}/repos/{owner}/{repo}", self.base_url))
            .bearer_auth(&self.token)
            .header("accept", "application/vnd.github+json")
            .send()
            .await
            .context("github repo get")?
            .error_for_status()
            .context("github repo non-2xx")?
            .json()
            .await
            .context("github repo body")?;
        Ok(resp.stargazers_count.unwrap_or(0))
    }
}

/// `https://github.com/owner/repo[/...]` → `(owner, repo)`.
pub fn owner_repo_from_url(repo_url: &str) -> Result<(String, String)> {
    let parsed = url::Url::parse(repo_url).with_context(|| format!("parsing {repo_url}"))?;
    if parsed.host_str() != Some("github.com") && parsed.host_str() != Some("www.github.com") {
        return Err(anyhow!("not a github.com URL: {repo_url}"));
    }
    let mut segs = parsed
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());
    match (segs.next(), segs.next()) {
        (Some(owner), Some(repo)) => Ok((
            owner.to_string(),
            repo.trim_end_matches(".git").to_string(),
        )),
        _ => Err(anyhow!("no owner/repo in {repo_url}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_repo_parses_common_shapes() {
        assert_eq!(
            owner_repo_from_url("https://github.com/tokio-rs/axum").unwrap(),
            ("tokio-rs".to_string(), "axum".to_string())
        );
        assert_eq!(
            owner_repo_from_url("https://github.com/a/b.git/").unwrap(),
            ("a".to_string(), "b".to_string())
        );
        assert_eq!(
            owner_repo_from_url("https://github.com/a/b/tree/main/src").unwrap(),
            ("a".to_string(), "b".to_string())
        );
    }

    #[test]
    fn owner_repo_rejects_non_repo_urls() {
        assert!(owner_repo_from_url("https://github.com/only-owner").is_err());
        assert!(owner_repo_from_url("https://gitlab.com/a/b").is_err());
        assert!(owner_repo_from_url("not a url").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn missing_token_fails_before_any_call() {
        let prev = std::env::var("GITHUB_TOKEN").ok();
        std::env::remove_var("GITHUB_TOKEN");
        let err = GithubClient::from_env().err().unwrap();
        assert_eq!(
            CurateError::find(&err),
            Some(&CurateError::MissingCredential("GITHUB_TOKEN"))
        );
        if let Some(v) = prev {
            std::env::set_var("GITHUB_TOKEN", v);
        }
    }
}
