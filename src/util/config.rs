//! Configuration file support for vndk-compat.
//!
//! Two configuration file locations are consulted:
//! - Global: `~/.vndk-compat/config.toml` - User-wide defaults
//! - Project: `.vndk-compat/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::score::DEFAULT_THRESHOLD;

/// Name of the configuration directory, both global and per project.
pub const CONFIG_DIR_NAME: &str = ".vndk-compat";

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Diff engine settings
    pub engine: EngineConfig,

    /// Scoring settings
    pub score: ScoreConfig,

    /// Policy lookup settings
    pub policy: PolicyConfig,

    /// Shim generation settings
    pub shim: ShimConfig,
}

/// Diff engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of classification workers (None = rayon default)
    pub jobs: Option<usize>,
}

/// Scoring configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreConfig {
    /// Pass threshold, 0-100
    pub threshold: Option<u32>,
}

/// Policy lookup configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Directory holding `v{N}.policy.json` files
    pub dir: Option<PathBuf>,
}

/// Shim generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Directory generated shim sources are written to
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.engine.jobs.is_some() {
            self.engine.jobs = other.engine.jobs;
        }
        if other.score.threshold.is_some() {
            self.score.threshold = other.score.threshold;
        }
        if other.policy.dir.is_some() {
            self.policy.dir = other.policy.dir;
        }
        if other.shim.output_dir.is_some() {
            self.shim.output_dir = other.shim.output_dir;
        }
    }

    /// Effective pass threshold.
    pub fn threshold(&self) -> u32 {
        self.score.threshold.unwrap_or(DEFAULT_THRESHOLD)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.vndk-compat/config.toml)
/// 2. Global config (~/.vndk-compat/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global config directory (~/.vndk-compat).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.vndk-compat/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.vndk-compat/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.engine.jobs.is_none());
        assert!(config.policy.dir.is_none());
        assert_eq!(config.threshold(), 90);
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[engine]
jobs = 8

[score]
threshold = 75

[policy]
dir = "vendor/policy"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.engine.jobs, Some(8));
        assert_eq!(config.threshold(), 75);
        assert_eq!(config.policy.dir, Some(PathBuf::from("vendor/policy")));
        assert!(config.shim.output_dir.is_none());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.engine.jobs = Some(4);
        base.score.threshold = Some(80);

        let mut override_cfg = Config::default();
        override_cfg.score.threshold = Some(95);

        base.merge(override_cfg);

        assert_eq!(base.threshold(), 95);
        assert_eq!(base.engine.jobs, Some(4)); // Not overridden
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(&global_path, "[score]\nthreshold = 60\n[engine]\njobs = 2\n").unwrap();
        std::fs::write(&project_path, "[score]\nthreshold = 85\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.threshold(), 85);
        assert_eq!(config.engine.jobs, Some(2));
    }

    #[test]
    fn test_broken_config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let project_path = tmp.path().join("config.toml");
        std::fs::write(&project_path, "[score\nthreshold = ").unwrap();

        let config = load_config(None, &project_path);
        assert_eq!(config.threshold(), DEFAULT_THRESHOLD);
    }
}
