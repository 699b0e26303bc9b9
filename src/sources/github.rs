// src/sources/github.rs
//! GitHub repository discovery.
//!
//! Three query groups ("new", "niche", "popular") run concurrently. Each
//! group gets its own snapshot of the seen set, so a URL counted toward one
//! group's quota does not consume another group's budget; the caller merges
//! the group results in order and drops cross-group duplicates.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use futures::future::join_all;
use metrics::counter;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{record_candidates, SourceLoader};
use crate::config::GithubSearchConfig;
use crate::error::CurateError;
use crate::github::RepoSearch;
use crate::store::{remember, DedupStore, SeenSet, SourceKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryGroup {
    pub name: &'static str,
    pub queries: Vec<String>,
    pub limit: usize,
}

/// `today - max_age_days` as `YYYY-MM-DD`. Negative ages count as 0; an age
/// that leaves the calendar range is a config error.
pub fn since_date(today: NaiveDate, max_age_days: i64) -> Result<String> {
    let since = Duration::try_days(max_age_days.max(0))
        .and_then(|age| today.checked_sub_signed(age))
        .ok_or_else(|| {
            CurateError::InvalidConfig(format!(
                "github.max_age_days out of range: {max_age_days}"
            ))
        })?;
    Ok(since.format("%Y-%m-%d").to_string())
}

/// Query groups in merge order: new, niche, popular.
pub fn build_query_groups(cfg: &GithubSearchConfig, since: &str) -> Vec<QueryGroup> {
    let ex = cfg.exclude_org.trim();
    let new_repos = cfg
        .terms
        .iter()
        .map(|t| format!("{t} created:>{since} {ex} stars:>10"))
        .collect();
    let popular = cfg
        .terms
        .iter()
        .map(|t| format!("{t} pushed:>{since} {ex} stars:>20"))
        .collect();
    let niche_term = cfg.niche_term.trim();
    let niche = if niche_term.is_empty() {
        Vec::new()
    } else {
        vec![
            format!("{niche_term} created:>{since} {ex} stars:>5"),
            format!("{niche_term} pushed:>{since} {ex} stars:>20"),
        ]
    };

    vec![
        QueryGroup {
            name: "new",
            queries: new_repos,
            limit: cfg.new_repos_limit,
        },
        QueryGroup {
            name: "niche",
            queries: niche,
            limit: cfg.niche_limit,
        },
        QueryGroup {
            name: "popular",
            queries: popular,
            limit: cfg.popular_repos_limit,
        },
    ]
}

/// Runs the group's queries in order until `group.limit` URLs are collected.
/// `seen` is this group's private accumulator. A failing query is logged and
/// skipped.
pub async fn search_group(
    search: &dyn RepoSearch,
    group: &QueryGroup,
    mut seen: SeenSet,
) -> Vec<String> {
    let mut results = Vec::new();
    for q in &group.queries {
        if results.len() >= group.limit {
            break;
        }
        match search.search_repositories(q).await {
            Ok(urls) => {
                for url in urls {
                    if results.len() >= group.limit {
                        break;
                    }
                    if seen.insert(url.clone()) {
                        results.push(url);
                    }
                }
            }
            Err(e) => {
                warn!(target: "github", error = ?e, query = %q, group = group.name, "repo search failed");
                crate::metrics::ensure_metrics_described();
                counter!("curate_search_errors_total").increment(1);
            }
        }
    }
    debug!(target: "github", group = group.name, found = results.len(), "query group done");
    results
}

/// Runs all groups concurrently, each from a snapshot of `previously_seen`,
/// and merges in group order without duplicates.
pub async fn search_new_repos(
    search: &dyn RepoSearch,
    groups: &[QueryGroup],
    previously_seen: &SeenSet,
) -> Vec<String> {
    let per_group = join_all(
        groups
            .iter()
            .map(|g| search_group(search, g, previously_seen.clone())),
    )
    .await;

    let mut merged = SeenSet::new();
    for urls in per_group {
        merged.extend(urls);
    }
    merged.into_vec()
}

pub struct GithubLoader {
    search: Arc<dyn RepoSearch>,
    store: Arc<dyn DedupStore>,
    config: GithubSearchConfig,
}

impl GithubLoader {
    pub fn new(
        search: Arc<dyn RepoSearch>,
        store: Arc<dyn DedupStore>,
        config: GithubSearchConfig,
    ) -> Self {
        Self {
            search,
            store,
            config,
        }
    }

    pub fn query_groups(&self, today: NaiveDate) -> Result<Vec<QueryGroup>> {
        let since = since_date(today, self.config.max_age_days)?;
        Ok(build_query_groups(&self.config, &since))
    }
}

#[async_trait]
impl SourceLoader for GithubLoader {
    async fn load(&self) -> Result<Vec<String>> {
        let previously_seen = SeenSet::from(self.store.get(SourceKey::GithubRepos).await?);
        let groups = self.query_groups(Utc::now().date_naive())?;
        let found = search_new_repos(self.search.as_ref(), &groups, &previously_seen).await;

        remember(self.store.as_ref(), SourceKey::GithubRepos, &found).await?;
        record_candidates(self.name(), found.len());
        info!(
            target: "github",
            found = found.len(),
            previously_seen = previously_seen.len(),
            "github repos discovered"
        );
        Ok(found)
    }

    fn name(&self) -> &'static str {
        "github"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn since_is_thirty_days_back() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        assert_eq!(since_date(today, 30).unwrap(), "2025-02-13");
        assert_eq!(since_date(today, -5).unwrap(), "2025-03-15");
    }

    #[test]
    fn out_of_range_age_is_a_config_error() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        for days in [i64::MAX, 400_000_000] {
            let err = since_date(today, days).unwrap_err();
            assert!(matches!(
                CurateError::find(&err),
                Some(CurateError::InvalidConfig(_))
            ));
            assert!(CurateError::is_fatal(&err));
        }
    }

    #[tokio::test]
    async fn loader_fails_fast_on_out_of_range_age() {
        let loader = GithubLoader::new(
            Arc::new(NoSearch),
            Arc::new(crate::store::MemoryStore::new()),
            GithubSearchConfig {
                max_age_days: i64::MAX,
                ..Default::default()
            },
        );
        let err = loader.load().await.unwrap_err();
        assert!(CurateError::is_fatal(&err));
    }

    struct NoSearch;

    #[async_trait]
    impl RepoSearch for NoSearch {
        async fn search_repositories(&self, _query: &str) -> Result<Vec<String>> {
            panic!("no search expected");
        }
    }

    #[test]
    fn groups_follow_default_config() {
        let groups = build_query_groups(&GithubSearchConfig::default(), "2025-01-01");
        let names: Vec<_> = groups.iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["new", "niche", "popular"]);
        assert_eq!(
            groups[0].queries,
            vec![
                "langgraph created:>2025-01-01 -org:langchain-ai stars:>10",
                "langchain created:>2025-01-01 -org:langchain-ai stars:>10",
            ]
        );
        assert_eq!(
            groups[1].queries,
            vec![
                "deepagents created:>2025-01-01 -org:langchain-ai stars:>5",
                "deepagents pushed:>2025-01-01 -org:langchain-ai stars:>20",
            ]
        );
        assert_eq!(
            groups[2].queries[1],
            "langchain pushed:>2025-01-01 -org:langchain-ai stars:>20"
        );
        assert_eq!(
            groups.iter().map(|g| g.limit).collect::<Vec<_>>(),
            vec![40, 10, 15]
        );
    }
}
