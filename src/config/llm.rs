// src/config/llm.rs
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::error::CurateError;

pub const ENV_LLM_CONFIG_PATH: &str = "LLM_CONFIG_PATH";
pub const DEFAULT_LLM_CONFIG_PATH: &str = "config/llm.json";

fn default_provider() -> String {
    "anthropic".into()
}
fn default_api_key() -> String {
    "ENV".into()
}
fn default_classification_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}
fn default_generation_model() -> String {
    "claude-3-5-sonnet-20241022".into()
}
fn default_generation_temperature() -> f32 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmConfig {
    /// "anthropic" | "openai" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// "ENV" means: read from ANTHROPIC_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_classification_model")]
    pub classification_model: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    #[serde(default)]
    pub classification_temperature: f32,
    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f32,
    /// Overrides the provider's API root (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: default_api_key(),
            classification_model: default_classification_model(),
            generation_model: default_generation_model(),
            classification_temperature: 0.0,
            generation_temperature: default_generation_temperature(),
            base_url: None,
        }
    }
}

impl LlmConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading llm config from {}", path.display()))?;
        let cfg: LlmConfig = serde_json::from_str(&data)?;
        cfg.normalized()
    }

    /// $LLM_CONFIG_PATH, then config/llm.json, then defaults.
    pub fn load_default() -> Result<Self> {
        let path = env::var(ENV_LLM_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LLM_CONFIG_PATH));
        if path.exists() {
            return Self::load_from_file(path);
        }
        Self::default().normalized()
    }

    /// Lowercases the provider, resolves an "ENV" api key, and clamps
    /// temperatures into 0.0..=1.0.
    pub fn normalized(mut self) -> Result<Self> {
        self.provider = self.provider.trim().to_lowercase();

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = match self.provider.as_str() {
                "anthropic" | "claude" => env::var("ANTHROPIC_API_KEY")
                    .map_err(|_| CurateError::MissingCredential("ANTHROPIC_API_KEY"))?,
                "openai" => env::var("OPENAI_API_KEY")
                    .map_err(|_| CurateError::MissingCredential("OPENAI_API_KEY"))?,
                other => bail!("Unsupported provider in config: {other}"),
            };
        }

        self.classification_temperature = self.classification_temperature.clamp(0.0, 1.0);
        self.generation_temperature = self.generation_temperature.clamp(0.0, 1.0);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn env_key_is_resolved_per_provider() {
        env::set_var("OPENAI_API_KEY", "sk-test");
        let cfg = LlmConfig {
            provider: " OpenAI ".into(),
            ..LlmConfig::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.api_key, "sk-test");
        env::remove_var("OPENAI_API_KEY");
    }

    #[serial_test::serial]
    #[test]
    fn missing_env_key_is_a_credential_error() {
        env::remove_var("ANTHROPIC_API_KEY");
        let err = LlmConfig::default().normalized().unwrap_err();
        assert_eq!(
            CurateError::find(&err),
            Some(&CurateError::MissingCredential("ANTHROPIC_API_KEY"))
        );
    }

    #[test]
    fn explicit_key_and_clamped_temperatures() {
        let cfg: LlmConfig = serde_json::from_str(
            r#"{"provider":"anthropic","api_key":"k","generation_temperature":3.0}"#,
        )
        .unwrap();
        let cfg = cfg.normalized().unwrap();
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.generation_temperature, 1.0);
        assert_eq!(cfg.classification_temperature, 0.0);
    }
}
