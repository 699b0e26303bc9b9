// src/bootstrap.rs
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::api::AppState;
use crate::config::{CurateConfig, LlmConfig};
use crate::content::FirecrawlLoader;
use crate::curate::CurationPipeline;
use crate::github::GithubClient;
use crate::llm::{build_provider, DynLlm, ModelRoles};
use crate::sources::{GithubLoader, LatentSpaceLoader, SlackClient, SlackLoader};
use crate::store::{DedupStore, JsonFileStore};
use crate::verify::RelevanceVerifier;

/// Everything a run needs, wired from config files and the environment.
pub struct CurateRuntime {
    pub cfg: CurateConfig,
    pub llm: DynLlm,
    pub roles: ModelRoles,
    pub pipeline: CurationPipeline,
}

impl CurateRuntime {
    /// Loads both configs with their default lookup rules and builds clients.
    /// Missing credentials fail here, before any network call.
    pub fn from_env() -> Result<Self> {
        let cfg = CurateConfig::load_default()?;
        let llm_cfg = LlmConfig::load_default()?;
        Self::build(cfg, &llm_cfg)
    }

    pub fn build(cfg: CurateConfig, llm_cfg: &LlmConfig) -> Result<Self> {
        // Safe diagnostics: only provider + models + key length
        info!(
            "LLM cfg loaded: provider={}, classification={}, generation={}, key_len={}",
            llm_cfg.provider,
            llm_cfg.classification_model,
            llm_cfg.generation_model,
            llm_cfg.api_key.len()
        );
        let llm = build_provider(llm_cfg)?;
        let roles = ModelRoles::from_config(llm_cfg);

        let github = Arc::new(GithubClient::from_env()?.with_per_page(cfg.github.per_page));
        let store: Arc<dyn DedupStore> = Arc::new(JsonFileStore::new(&cfg.store.dir)?);
        let verifier = RelevanceVerifier::new(
            Arc::new(FirecrawlLoader::from_env()?),
            llm.clone(),
            roles.classification.clone(),
            &cfg.product,
        );

        let mut pipeline = CurationPipeline::new(
            Arc::new(GithubLoader::new(
                github.clone(),
                store.clone(),
                cfg.github.clone(),
            )),
            verifier,
            github,
        )
        .with_web_loader(Arc::new(LatentSpaceLoader::new(
            cfg.latent_space.base_url.clone(),
            store,
        )?));

        if cfg.slack.skip_ingest {
            pipeline = pipeline.with_slack(SlackLoader::links_only(cfg.slack.clone()));
        } else if cfg.slack.channel_id.is_some() {
            let client = Arc::new(SlackClient::from_env()?);
            pipeline = pipeline.with_slack(SlackLoader::new(client, cfg.slack.clone()));
        }

        Ok(Self {
            cfg,
            llm,
            roles,
            pipeline,
        })
    }

    pub fn into_app_state(self) -> AppState {
        AppState {
            pipeline: Arc::new(self.pipeline),
            llm: self.llm,
            roles: Arc::new(self.roles),
        }
    }
}
