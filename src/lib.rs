// src/lib.rs
// Public library surface for integration tests and the binaries.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod content;
pub mod curate;
pub mod error;
pub mod github;
pub mod llm;
pub mod metrics;
pub mod post;
pub mod prompts;
pub mod sources;
pub mod store;
pub mod verify;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::curate::{format_data, CuratedData, CurationInputs, CurationPipeline};
pub use crate::error::CurateError;

/// Shared HTTP client settings for every outbound integration.
pub(crate) fn http_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent(concat!("content-curator/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(std::time::Duration::from_secs(10))
        .timeout(std::time::Duration::from_secs(120))
        .build()?)
}
