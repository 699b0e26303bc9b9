// src/curate/mod.rs
pub mod format;
pub mod github_wrapper;
pub mod pipeline;
pub mod types;

pub use format::format_data;
pub use github_wrapper::{fetch_stargazers_count, verify_github_wrapper};
pub use pipeline::{CurationPipeline, CurationRequest};
pub use types::{
    CuratedData, CurationInputs, GeneralContent, GithubTrendingData, PublicMetrics,
    RedditComment, RedditPost, RedditPostData, Tweet, TweetsGroupedByContent,
};
