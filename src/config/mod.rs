pub mod curate;
pub mod llm;

pub use curate::{
    CurateConfig, GithubSearchConfig, LatentSpaceConfig, ProductConfig, SlackConfig, StoreConfig,
};
pub use llm::LlmConfig;
