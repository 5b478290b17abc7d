use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "rankaudit.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub titles: TitlesConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub prevalence: PrevalenceConfig,
}

/// External trec_eval configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default = "default_evaluator_binary")]
    pub binary: PathBuf,
    #[serde(default = "default_measures")]
    pub measures: Vec<String>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            binary: default_evaluator_binary(),
            measures: default_measures(),
        }
    }
}

/// Entity title mapping (SQLite table `entity_id_mapping(id, entity)`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitlesConfig {
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

/// Overlap filter output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_run_tag")]
    pub run_tag: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            run_tag: default_run_tag(),
        }
    }
}

/// Entity prevalence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PrevalenceConfig {
    /// Limit prevalence to the top-k entities per query; negative means no limit.
    #[serde(default = "default_top_k")]
    pub top_k: i64,
}

impl Default for PrevalenceConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

impl PrevalenceConfig {
    pub fn limit(&self) -> Option<usize> {
        top_k_limit(self.top_k)
    }
}

/// `None` for negative values (no limit).
pub fn top_k_limit(k: i64) -> Option<usize> {
    usize::try_from(k).ok()
}

fn default_evaluator_binary() -> PathBuf {
    PathBuf::from("trec_eval")
}

fn default_measures() -> Vec<String> {
    ["map", "ndcg_cut.20", "P.20", "recip_rank"]
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_run_tag() -> String {
    "Entity-Filtered".to_string()
}

fn default_top_k() -> i64 {
    20
}

impl Config {
    /// Load configuration
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in RANKAUDIT_CONFIG environment variable (must exist)
    /// 2. ./rankaudit.toml in current directory
    /// 3. Built-in defaults
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config = match std::env::var("RANKAUDIT_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    log::debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    Config::default()
                }
            }
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.evaluator.measures.is_empty() {
            anyhow::bail!("evaluator.measures must list at least one trec_eval measure");
        }

        if self.filter.run_tag.is_empty() || self.filter.run_tag.chars().any(char::is_whitespace) {
            anyhow::bail!(
                "filter.run_tag must be a non-empty single token, got '{}'",
                self.filter.run_tag
            );
        }

        if let Some(ref db_path) = self.titles.db_path {
            if !db_path.is_file() {
                anyhow::bail!(
                    "titles.db_path does not exist: {}. Remove it from the config to run without titles.",
                    db_path.display()
                );
            }
        }

        Ok(())
    }
}
