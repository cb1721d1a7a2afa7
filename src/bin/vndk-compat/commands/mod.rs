//! Command implementations

pub mod classify;
pub mod linker_config;
pub mod score;
pub mod shim;

use std::path::Path;

use anyhow::{Context, Result};

use vndk_compat::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global config, then project config, then the `--config` file.
pub fn load_effective_config(explicit: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let global = global_config_path();
    let mut config = load_config(global.as_deref(), &project_config_path(&cwd));

    if let Some(path) = explicit {
        config.merge(Config::load(path)?);
    }

    Ok(config)
}
