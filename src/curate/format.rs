// src/curate/format.rs
use std::cmp::Reverse;

use super::types::{CuratedData, CurationInputs, GeneralContent};

/// Merges everything collected in one run into [`CuratedData`].
///
/// Tweet groups, Reddit posts and GitHub repos are sorted descending by
/// engagement, score and stars (missing values count as 0; ties keep input
/// order). General contents keep their order and are paired with
/// `relevant_links` by index. Categories absent from the input stay absent.
pub fn format_data(inputs: &CurationInputs) -> CuratedData {
    let tweets_grouped_by_content = inputs.tweets_grouped_by_content.as_ref().map(|groups| {
        let mut v = groups.clone();
        v.sort_by_key(|g| Reverse(g.engagement()));
        v
    });

    let reddit_posts = inputs.reddit_posts.as_ref().map(|posts| {
        let mut v = posts.clone();
        v.sort_by_key(|p| Reverse(p.score()));
        v
    });

    let general_contents = inputs.page_contents.as_ref().map(|contents| {
        contents
            .iter()
            .enumerate()
            .map(|(idx, pc)| GeneralContent {
                page_content: pc.clone(),
                relevant_links: inputs
                    .relevant_links
                    .as_ref()
                    .and_then(|links| links.get(idx))
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect()
    });

    let github_trending_data = inputs.github_trending_data.as_ref().map(|repos| {
        let mut v = repos.clone();
        v.sort_by_key(|r| Reverse(r.stargazers_count));
        v
    });

    CuratedData {
        tweets_grouped_by_content,
        reddit_posts,
        general_contents,
        github_trending_data,
    }
}
