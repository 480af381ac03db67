//! # Duel Configuration
//!
//! Collaborator endpoints, credentials and pipeline timings.
//!
//! Resolution order: built-in defaults, then an optional JSON file
//! (`DuelConfig::load`), then environment overrides (`DuelConfig::apply_env`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::{LlmProvider, ModelConfig};

/// Top-level configuration for a [`DuelCoordinator`](crate::duel::DuelCoordinator)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DuelConfig {
    /// Language model used for the roast narrative
    pub model: ModelConfig,
    pub narrative: NarrativeSettings,
    /// Interval between flavor progress messages while the narrative is pending
    pub ticker_interval_ms: u64,
    pub bright_data: BrightDataConfig,
    pub github: GitHubConfig,
    pub wikipedia: WikipediaConfig,
    pub dom: DomConfig,
    /// SQLite file for sessions; `None` keeps sessions in memory
    pub session_db: Option<PathBuf>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            narrative: NarrativeSettings::default(),
            ticker_interval_ms: 4000,
            bright_data: BrightDataConfig::default(),
            github: GitHubConfig::default(),
            wikipedia: WikipediaConfig::default(),
            dom: DomConfig::default(),
            session_db: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NarrativeSettings {
    /// Hard deadline for the completion call
    pub timeout_secs: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 45,
            temperature: 0.9,
            max_tokens: 1500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BrightDataConfig {
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub linkedin_dataset: String,
    pub generic_dataset: String,
    pub timeout_secs: u64,
}

impl Default for BrightDataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.brightdata.com/datasets/v3".to_string(),
            linkedin_dataset: "gd_l1viktl72bvl7bjuj0".to_string(),
            generic_dataset: "gd_l1viktkq1w3g0xd5bq".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WikipediaConfig {
    pub rest_url: String,
    pub action_url: String,
    pub timeout_secs: u64,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://en.wikipedia.org/api/rest_v1".to_string(),
            action_url: "https://en.wikipedia.org/w/api.php".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DomConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for DomConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 20,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/131.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl DuelConfig {
    /// Load from a JSON file, returning defaults if the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("DEVDUEL_LLM_PROVIDER").and_then(|p| LlmProvider::parse(&p)) {
            self.model.provider = provider;
        }
        if let Some(model) = get("DEVDUEL_LLM_MODEL") {
            self.model.model = model;
        }
        if let Some(url) = get("LLM_BASE_URL") {
            self.model.base_url = Some(url);
        }
        if let Some(key) = get("BRIGHTDATA_API_KEY") {
            self.bright_data.api_key = Some(key);
        }
        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(db) = get("DEVDUEL_SESSION_DB") {
            self.session_db = Some(PathBuf::from(db));
        }
        if let Some(secs) = get("DEVDUEL_NARRATIVE_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.narrative.timeout_secs = secs;
        }
        if let Some(ms) = get("DEVDUEL_TICKER_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            self.ticker_interval_ms = ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_pipeline_timings() {
        let config = DuelConfig::default();
        assert_eq!(config.narrative.timeout_secs, 45);
        assert_eq!(config.narrative.max_tokens, 1500);
        assert_eq!(config.ticker_interval_ms, 4000);
        assert_eq!(config.bright_data.timeout_secs, 120);
        assert!(config.session_db.is_none());
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DEVDUEL_LLM_PROVIDER", "deepseek"),
            ("DEVDUEL_LLM_MODEL", "deepseek-chat"),
            ("BRIGHTDATA_API_KEY", "bd-key"),
            ("GITHUB_TOKEN", ""),
            ("DEVDUEL_NARRATIVE_TIMEOUT_SECS", "10"),
            ("DEVDUEL_TICKER_INTERVAL_MS", "not-a-number"),
        ]);

        let mut config = DuelConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.model.provider, LlmProvider::DeepSeek);
        assert_eq!(config.model.model, "deepseek-chat");
        assert_eq!(config.bright_data.api_key.as_deref(), Some("bd-key"));
        assert!(config.github.token.is_none());
        assert_eq!(config.narrative.timeout_secs, 10);
        assert_eq!(config.ticker_interval_ms, 4000);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DuelConfig::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, DuelConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devduel.json");
        std::fs::write(
            &path,
            r#"{ "ticker_interval_ms": 250, "github": { "api_url": "http://localhost:9000" } }"#,
        )
        .unwrap();

        let config = DuelConfig::load(&path).unwrap();
        assert_eq!(config.ticker_interval_ms, 250);
        assert_eq!(config.github.api_url, "http://localhost:9000");
        assert_eq!(config.github.timeout_secs, 15);
        assert_eq!(config.model.model, "gpt-4o-mini");
    }
}
