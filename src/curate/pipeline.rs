// src/curate/pipeline.rs
use anyhow::Result;
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::format::format_data;
use super::github_wrapper::verify_github_wrapper;
use super::types::{CuratedData, CurationInputs, RedditPost, TweetsGroupedByContent};
use crate::error::CurateError;
use crate::github::RepoMetadata;
use crate::sources::{SlackLoader, SourceLoader};
use crate::store::SeenSet;
use crate::verify::RelevanceVerifier;

/// Extra inputs for one run. Tweets and Reddit posts are collected
/// elsewhere and only ranked here; `links` are pre-supplied general links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurationRequest {
    pub links: Vec<String>,
    pub tweets_grouped_by_content: Option<Vec<TweetsGroupedByContent>>,
    pub reddit_posts: Option<Vec<RedditPost>>,
}

pub struct CurationPipeline {
    github: Arc<dyn SourceLoader>,
    web: Vec<Arc<dyn SourceLoader>>,
    slack: Option<SlackLoader>,
    verifier: RelevanceVerifier,
    repo_meta: Arc<dyn RepoMetadata>,
}

impl CurationPipeline {
    pub fn new(
        github: Arc<dyn SourceLoader>,
        verifier: RelevanceVerifier,
        repo_meta: Arc<dyn RepoMetadata>,
    ) -> Self {
        Self {
            github,
            web: Vec::new(),
            slack: None,
            verifier,
            repo_meta,
        }
    }

    /// Adds a loader whose links are verified as general web content.
    pub fn with_web_loader(mut self, loader: Arc<dyn SourceLoader>) -> Self {
        self.web.push(loader);
        self
    }

    pub fn with_slack(mut self, slack: SlackLoader) -> Self {
        self.slack = Some(slack);
        self
    }

    /// One full pass: load every source concurrently, verify, rank.
    pub async fn run(&self, req: CurationRequest) -> Result<CuratedData> {
        crate::metrics::ensure_metrics_described();

        let web_loads = futures::future::join_all(self.web.iter().map(|l| load_branch(l.as_ref())));
        let slack_load = async {
            match &self.slack {
                Some(s) => s.load(&req.links).await.map(Some),
                None => Ok(None),
            }
        };
        let (raw_repos, web_links, slack_links) =
            tokio::join!(load_branch(self.github.as_ref()), web_loads, slack_load);

        let raw_repos = raw_repos?;
        let mut general = SeenSet::new();
        for links in web_links {
            general.extend(links?);
        }
        general.extend(req.links.iter().cloned());
        match slack_links {
            Ok(Some(links)) => general.extend(links),
            Ok(None) => {}
            Err(e) if CurateError::is_fatal(&e) => return Err(e),
            Err(e) => {
                warn!(target: "curate", error = ?e, source = "slack", "source branch failed");
                counter!("curate_branch_errors_total", "source" => "slack").increment(1);
            }
        }

        let github_trending_data =
            verify_github_wrapper(&raw_repos, &self.verifier, self.repo_meta.as_ref()).await?;

        let mut page_contents = Vec::new();
        let mut relevant_links = Vec::new();
        for link in general.iter() {
            match self.verifier.verify(link).await {
                Ok(v) => {
                    if let Some((l, content)) = v.into_pair() {
                        relevant_links.push(vec![l]);
                        page_contents.push(content);
                    }
                }
                Err(e) if CurateError::is_fatal(&e) => return Err(e),
                Err(e) => {
                    warn!(target: "verify", error = ?e, link = %link, "link verification failed, skipping");
                }
            }
        }

        let inputs = CurationInputs {
            tweets_grouped_by_content: req.tweets_grouped_by_content,
            reddit_posts: req.reddit_posts,
            page_contents: Some(page_contents),
            relevant_links: Some(relevant_links),
            github_trending_data: Some(github_trending_data),
        };
        let curated = format_data(&inputs);

        gauge!("curate_pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        info!(
            target: "curate",
            github = curated.github_trending_data.as_ref().map_or(0, Vec::len),
            general = curated.general_contents.as_ref().map_or(0, Vec::len),
            candidates = general.len() + raw_repos.len(),
            "curation run finished"
        );
        Ok(curated)
    }
}

/// Runs one loader; non-fatal failures become an empty branch.
async fn load_branch(loader: &dyn SourceLoader) -> Result<Vec<String>> {
    match loader.load().await {
        Ok(v) => Ok(v),
        Err(e) if CurateError::is_fatal(&e) => Err(e),
        Err(e) => {
            warn!(target: "curate", error = ?e, source = loader.name(), "source branch failed");
            counter!("curate_branch_errors_total", "source" => loader.name()).increment(1);
            Ok(Vec::new())
        }
    }
}
