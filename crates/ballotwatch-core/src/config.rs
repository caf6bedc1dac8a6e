use crate::completeness::CompletenessConfig;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = ".ballotwatch/elections.db";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// Application configuration (`ballotwatch.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_upcoming_limit")]
    pub upcoming_limit: u32,
    #[serde(default)]
    pub completeness: CompletenessConfig,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_upcoming_limit() -> u32 {
    crate::fetch::DEFAULT_UPCOMING_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            poll_interval_ms: default_poll_interval_ms(),
            upcoming_limit: default_upcoming_limit(),
            completeness: CompletenessConfig::default(),
        }
    }
}

pub fn load_config(path: &Path, strict: bool) -> Result<AppConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = std::collections::HashSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);

    // serde_ignored wrapper to capture unknown fields
    let cfg: AppConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    if !ignored_keys.is_empty() {
        let meaningful: Vec<_> = ignored_keys
            .iter()
            .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
            .collect();
        if !meaningful.is_empty() {
            if strict {
                return Err(ConfigError(format!(
                    "unknown fields detected in strict mode: {:?} (file: {})",
                    meaningful,
                    path.display()
                )));
            }
            tracing::warn!(
                event = "config.ignored_keys",
                keys = ?meaningful,
                "ignored unknown config fields"
            );
        }
    }

    if cfg.poll_interval_ms == 0 {
        return Err(ConfigError("poll_interval_ms must be positive".into()));
    }
    if cfg.upcoming_limit == 0 {
        return Err(ConfigError("upcoming_limit must be positive".into()));
    }

    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"db_path: .ballotwatch/elections.db
poll_interval_ms: 30000
upcoming_limit: 50
completeness:
  min_total: 160
  min_per_level: 50
  # required_states defaults to the 50 states + DC; override to narrow it:
  # required_states: ["OH", "TX", "CA"]
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
