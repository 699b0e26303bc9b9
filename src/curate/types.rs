// src/curate/types.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicMetrics {
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub reply_count: u64,
    #[serde(default)]
    pub quote_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_metrics: Option<PublicMetrics>,
}

impl Tweet {
    /// like + retweet + reply + quote, saturating; a tweet without metrics
    /// adds 0.
    pub fn engagement(&self) -> u64 {
        self.public_metrics
            .as_ref()
            .map(|m| {
                m.like_count
                    .saturating_add(m.retweet_count)
                    .saturating_add(m.reply_count)
                    .saturating_add(m.quote_count)
            })
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetsGroupedByContent {
    pub explanation: String,
    pub tweets: Vec<Tweet>,
}

impl TweetsGroupedByContent {
    pub fn engagement(&self) -> u64 {
        self.tweets
            .iter()
            .map(Tweet::engagement)
            .fold(0, u64::saturating_add)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selftext: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditComment {
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedditPost {
    pub post: RedditPostData,
    #[serde(default)]
    pub comments: Vec<RedditComment>,
}

impl RedditPost {
    pub fn score(&self) -> i64 {
        self.post.score.unwrap_or(0)
    }
}

/// A verified GitHub repository plus its popularity signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubTrendingData {
    #[serde(rename = "repoURL")]
    pub repo_url: String,
    pub page_content: String,
    /// 0 when the lookup failed or the record came in without it.
    #[serde(default)]
    pub stargazers_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralContent {
    pub page_content: String,
    pub relevant_links: Vec<String>,
}

/// Inputs to the formatter. `None` means "this category was not collected".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurationInputs {
    pub tweets_grouped_by_content: Option<Vec<TweetsGroupedByContent>>,
    pub reddit_posts: Option<Vec<RedditPost>>,
    pub page_contents: Option<Vec<String>>,
    /// Positionally paired with `page_contents`.
    pub relevant_links: Option<Vec<Vec<String>>>,
    pub github_trending_data: Option<Vec<GithubTrendingData>>,
}

/// Final, ranked output of one run. Absent categories are omitted from the
/// JSON rather than serialised as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CuratedData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tweets_grouped_by_content: Option<Vec<TweetsGroupedByContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reddit_posts: Option<Vec<RedditPost>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_contents: Option<Vec<GeneralContent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_trending_data: Option<Vec<GithubTrendingData>>,
}
