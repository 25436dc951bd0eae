use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::memory::decay::DEFAULT_DECAY_RATE;
use crate::memory::folders::FolderOptions;
use crate::memory::scoring::{FiveFactorWeights, LegacyWeights, ScoringModel, ScoringOptions};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MemrankConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub folders: FoldersConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScoringConfig {
    pub model: ScoringModel,
    pub decay_rate: f64,
    pub legacy: LegacyWeights,
    pub five_factor: FiveFactorWeights,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FoldersConfig {
    pub limit: Option<usize>,
    pub include_archived: bool,
    pub exclude_patterns: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_memrank_dir()
            .join("memrank.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            model: ScoringModel::Legacy,
            decay_rate: DEFAULT_DECAY_RATE,
            legacy: LegacyWeights::default(),
            five_factor: FiveFactorWeights::default(),
        }
    }
}

/// Returns `~/.memrank/`, or `./.memrank/` when no home directory is known.
pub fn default_memrank_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".memrank")
}

/// Returns the default config file path: `~/.memrank/config.toml`
pub fn default_config_path() -> PathBuf {
    default_memrank_dir().join("config.toml")
}

impl MemrankConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            MemrankConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides (MEMRANK_DB, MEMRANK_LOG_LEVEL, MEMRANK_MODEL).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("MEMRANK_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("MEMRANK_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("MEMRANK_MODEL") {
            self.scoring.model = val
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))
                .context("invalid MEMRANK_MODEL")?;
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }

    /// Scoring options seeded from the `[scoring]` section.
    pub fn scoring_options(&self) -> ScoringOptions {
        ScoringOptions {
            model: self.scoring.model,
            decay_rate: self.scoring.decay_rate,
            legacy_weights: self.scoring.legacy.clone(),
            five_factor_weights: self.scoring.five_factor.clone(),
            ..ScoringOptions::default()
        }
    }

    /// Folder options seeded from the `[folders]` section.
    pub fn folder_options(&self) -> FolderOptions {
        FolderOptions {
            decay_rate: self.scoring.decay_rate,
            include_archived: self.folders.include_archived,
            limit: self.folders.limit,
            exclude_patterns: self.folders.exclude_patterns.clone(),
            ..FolderOptions::default()
        }
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
