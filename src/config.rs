//! Configuration management
//!
//! Generator endpoint, tier-transition thresholds, and exercise set sizes.
//! Stored as TOML in the platform config directory and created with defaults
//! on first load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::exercises::validator::DEFAULT_MIN_USABLE_ITEMS;
use crate::exercises::ITEMS_PER_SET;
use crate::generator::openrouter::OPENROUTER_BASE_URL;
use crate::proficiency::scorer::{MAX_SCORE, MIN_SCORE};
use crate::proficiency::tracker::{DEFAULT_DEMOTE_THRESHOLD, DEFAULT_PROMOTE_THRESHOLD};
use crate::proficiency::TrackerThresholds;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Remote text generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Tier transition thresholds
    #[serde(default)]
    pub tracker: TrackerConfig,
    /// Exercise set sizes
    #[serde(default)]
    pub exercises: ExercisesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// OpenAI-compatible API base, without `/chat/completions`
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Upper bound on one generation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cap applied on top of the per-tier token budget
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    OPENROUTER_BASE_URL.to_string()
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Score at or above which an increase recommendation promotes
    #[serde(default = "default_promote_threshold")]
    pub promote_threshold: f64,
    /// Score at or below which a decrease recommendation demotes
    #[serde(default = "default_demote_threshold")]
    pub demote_threshold: f64,
}

fn default_promote_threshold() -> f64 {
    DEFAULT_PROMOTE_THRESHOLD
}

fn default_demote_threshold() -> f64 {
    DEFAULT_DEMOTE_THRESHOLD
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            promote_threshold: default_promote_threshold(),
            demote_threshold: default_demote_threshold(),
        }
    }
}

impl TrackerConfig {
    pub fn thresholds(&self) -> TrackerThresholds {
        TrackerThresholds {
            promote: self.promote_threshold,
            demote: self.demote_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisesConfig {
    #[serde(default = "default_items_per_set")]
    pub items_per_set: usize,
    /// Below this many valid items the static set is served instead
    #[serde(default = "default_min_usable_items")]
    pub min_usable_items: usize,
}

fn default_items_per_set() -> usize {
    ITEMS_PER_SET
}

fn default_min_usable_items() -> usize {
    DEFAULT_MIN_USABLE_ITEMS
}

impl Default for ExercisesConfig {
    fn default() -> Self {
        Self {
            items_per_set: default_items_per_set(),
            min_usable_items: default_min_usable_items(),
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load from an explicit path, writing defaults if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            config.check()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    fn check(&self) -> Result<()> {
        for (name, value) in [
            ("promote_threshold", self.tracker.promote_threshold),
            ("demote_threshold", self.tracker.demote_threshold),
        ] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                anyhow::bail!(
                    "tracker.{} ({}) must be within the score range {}..={}",
                    name,
                    value,
                    MIN_SCORE,
                    MAX_SCORE
                );
            }
        }
        if self.tracker.demote_threshold >= self.tracker.promote_threshold {
            anyhow::bail!(
                "tracker.demote_threshold ({}) must be below tracker.promote_threshold ({})",
                self.tracker.demote_threshold,
                self.tracker.promote_threshold
            );
        }
        if self.exercises.min_usable_items == 0 || self.exercises.items_per_set == 0 {
            anyhow::bail!("exercises.items_per_set and exercises.min_usable_items must be at least 1");
        }
        if self.exercises.min_usable_items > self.exercises.items_per_set {
            anyhow::bail!(
                "exercises.min_usable_items ({}) cannot exceed exercises.items_per_set ({})",
                self.exercises.min_usable_items,
                self.exercises.items_per_set
            );
        }
        if self.generator.timeout_secs == 0 {
            anyhow::bail!("generator.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "estonian-tutor", "estonian-tutor")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

pub fn show_config(config: &Config, path: &Path) {
    println!("Config file: {}", path.display());
    println!();
    println!("[generator]");
    println!("  base_url         {}", config.generator.base_url);
    println!("  model            {}", config.generator.model);
    println!("  timeout_secs     {}", config.generator.timeout_secs);
    println!("  max_tokens       {}", config.generator.max_tokens);
    let key_state = if std::env::var(&config.generator.api_key_env).is_ok() {
        "set"
    } else {
        "not set"
    };
    println!("  api_key_env      {} ({})", config.generator.api_key_env, key_state);
    println!("[tracker]");
    println!("  promote_threshold {}", config.tracker.promote_threshold);
    println!("  demote_threshold  {}", config.tracker.demote_threshold);
    println!("[exercises]");
    println!("  items_per_set    {}", config.exercises.items_per_set);
    println!("  min_usable_items {}", config.exercises.min_usable_items);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_constants() {
        let config = Config::default();
        assert_eq!(config.generator.timeout_secs, 30);
        assert_eq!(config.generator.max_tokens, 2000);
        assert_eq!(config.generator.api_key_env, "OPENROUTER_API_KEY");
        assert_eq!(config.tracker.promote_threshold, 4.5);
        assert_eq!(config.tracker.demote_threshold, 2.0);
        assert_eq!(config.exercises.items_per_set, 5);
        assert_eq!(config.exercises.min_usable_items, 1);
    }

    #[test]
    fn test_load_creates_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.generator.model = "meta-llama/llama-3.1-8b-instruct".to_string();
        config.tracker.promote_threshold = 4.0;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.generator.model, "meta-llama/llama-3.1-8b-instruct");
        assert_eq!(loaded.tracker.thresholds().promote, 4.0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[generator]\ntimeout_secs = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.generator.timeout_secs, 5);
        assert_eq!(config.generator.base_url, OPENROUTER_BASE_URL);
        assert_eq!(config.exercises, ExercisesConfig::default());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tracker]\npromote_threshold = 2.0\ndemote_threshold = 3.0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_rejects_min_above_set_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[exercises]\nitems_per_set = 3\nmin_usable_items = 4\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("min_usable_items"));
    }

    #[test]
    fn test_rejects_threshold_outside_score_range() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[tracker]\npromote_threshold = 6.0\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[tracker]\ndemote_threshold = 0.5\n").unwrap();
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[tracker]\npromote_threshold = 5.0\ndemote_threshold = 1.0\n").unwrap();
        assert!(Config::load_from(&path).is_ok());
    }
}
