// src/config/curate.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CURATE_CONFIG_PATH: &str = "CURATE_CONFIG_PATH";
pub const DEFAULT_CURATE_CONFIG_PATH: &str = "config/curate.toml";

/// Run configuration for one curation pass. Every field has a default, so an
/// empty (or absent) TOML file yields a usable config.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CurateConfig {
    pub slack: SlackConfig,
    pub github: GithubSearchConfig,
    pub latent_space: LatentSpaceConfig,
    pub store: StoreConfig,
    pub product: ProductConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlackConfig {
    pub channel_id: Option<String>,
    /// Reuse externally supplied links instead of reading the channel.
    pub skip_ingest: bool,
    pub max_messages: Option<usize>,
    pub max_days_history: Option<u64>,
}

impl SlackConfig {
    /// History window in hours (`max_days_history * 24`).
    pub fn max_hours_history(&self) -> Option<u64> {
        self.max_days_history.map(|d| d.saturating_mul(24))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GithubSearchConfig {
    pub terms: Vec<String>,
    pub niche_term: String,
    pub exclude_org: String,
    pub max_age_days: i64,
    pub new_repos_limit: usize,
    pub popular_repos_limit: usize,
    pub niche_limit: usize,
    pub per_page: u8,
}

impl Default for GithubSearchConfig {
    fn default() -> Self {
        Self {
            terms: vec!["langgraph".into(), "langchain".into()],
            niche_term: "deepagents".into(),
            exclude_org: "-org:langchain-ai".into(),
            max_age_days: 30,
            new_repos_limit: 40,
            popular_repos_limit: 15,
            niche_limit: 10,
            per_page: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LatentSpaceConfig {
    pub base_url: String,
}

impl Default for LatentSpaceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.latent.space".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("cache/seen"),
        }
    }
}

/// What "relevant" means for the classification step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProductConfig {
    pub name: String,
    pub context: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        Self {
            name: "LangChain".into(),
            context: "- LangChain: an open source framework for building applications with LLMs.\n\
                      - LangGraph: a library for building stateful, multi-actor agent applications.\n\
                      - LangSmith: a platform for tracing, evaluating and monitoring LLM applications."
                .into(),
        }
    }
}

impl CurateConfig {
    /// Load from an explicit TOML path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading curate config from {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Load using env var + fallbacks:
    /// 1) $CURATE_CONFIG_PATH
    /// 2) config/curate.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CURATE_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_CURATE_CONFIG_PATH} points to non-existent path"));
        }
        let p = PathBuf::from(DEFAULT_CURATE_CONFIG_PATH);
        if p.exists() {
            return Self::load_from(&p);
        }
        Ok(Self::default())
    }

    pub fn parse(s: &str) -> Result<Self> {
        let mut cfg: CurateConfig = toml::from_str(s)?;
        cfg.github.terms = clean_list(std::mem::take(&mut cfg.github.terms));
        cfg.slack.channel_id = cfg
            .slack
            .channel_id
            .take()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(cfg)
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
