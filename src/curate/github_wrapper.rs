// src/curate/github_wrapper.rs
use anyhow::Result;
use futures::future::join_all;
use metrics::counter;
use std::collections::HashSet;
use tracing::{info, warn};

use super::types::GithubTrendingData;
use crate::error::CurateError;
use crate::github::{owner_repo_from_url, RepoMetadata};
use crate::verify::RelevanceVerifier;

/// Star count of `repo_url`; any failure yields 0.
pub async fn fetch_stargazers_count(meta: &dyn RepoMetadata, repo_url: &str) -> u64 {
    let res = match owner_repo_from_url(repo_url) {
        Ok((owner, repo)) => meta.stargazers(&owner, &repo).await,
        Err(e) => Err(e),
    };
    res.unwrap_or_else(|e| {
        warn!(target: "github", error = ?e, repo = repo_url, "stargazer lookup failed, using 0");
        crate::metrics::ensure_metrics_described();
        counter!("curate_stargazer_errors_total").increment(1);
        0
    })
}

/// Verifies raw repo URLs one at a time, then fills in star counts for the
/// survivors concurrently.
///
/// Repeated URLs are verified once. A repo whose crawl or classification
/// fails is skipped; fatal errors still propagate.
pub async fn verify_github_wrapper(
    raw_repos: &[String],
    verifier: &RelevanceVerifier,
    meta: &dyn RepoMetadata,
) -> Result<Vec<GithubTrendingData>> {
    let mut seen = HashSet::new();
    let mut verified = Vec::new();

    for repo_url in raw_repos {
        if !seen.insert(repo_url.as_str()) {
            continue;
        }
        match verifier.verify(repo_url).await {
            Ok(v) => {
                if let Some((_, page_content)) = v.into_pair() {
                    verified.push(GithubTrendingData {
                        repo_url: repo_url.clone(),
                        page_content,
                        stargazers_count: 0,
                    });
                }
            }
            Err(e) if CurateError::is_fatal(&e) => return Err(e),
            Err(e) => {
                warn!(target: "verify", error = ?e, repo = %repo_url, "repo verification failed, skipping");
            }
        }
    }

    join_all(verified.iter_mut().map(|d| async move {
        d.stargazers_count = fetch_stargazers_count(meta, &d.repo_url).await;
    }))
    .await;

    info!(
        target: "curate",
        raw = raw_repos.len(),
        verified = verified.len(),
        "github repos verified"
    );
    Ok(verified)
}
