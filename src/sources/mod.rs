// src/sources/mod.rs
pub mod github;
pub mod latent_space;
pub mod slack;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

use crate::store::SeenSet;

pub use github::{GithubLoader, QueryGroup};
pub use latent_space::LatentSpaceLoader;
pub use slack::{ChannelMessageSource, HistoryWindow, SlackClient, SlackLoader, SlackMessage};

/// A loader fetches unverified candidate links from one external source,
/// already filtered against what the source handed out on earlier runs.
#[async_trait]
pub trait SourceLoader: Send + Sync {
    async fn load(&self) -> Result<Vec<String>>;
    fn name(&self) -> &'static str;
}

/// Items of `found` that are not in `processed`, first occurrence wins.
pub fn unique_items(processed: &SeenSet, found: Vec<String>) -> Vec<String> {
    let mut fresh = SeenSet::new();
    for it in found {
        let t = it.trim();
        if t.is_empty() || processed.contains(t) {
            continue;
        }
        fresh.insert(t.to_string());
    }
    fresh.into_vec()
}

pub(crate) fn record_candidates(source: &'static str, n: usize) {
    crate::metrics::ensure_metrics_described();
    counter!("curate_candidates_total", "source" => source).increment(n as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_items_drops_processed_and_repeats() {
        let processed = SeenSet::from(vec!["a".to_string()]);
        let out = unique_items(
            &processed,
            vec!["a".into(), "b".into(), " b ".into(), "".into(), "c".into()],
        );
        assert_eq!(out, vec!["b", "c"]);
    }
}
