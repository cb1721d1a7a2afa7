//! Implementation of `vndk-compat linker-config`.

use std::path::PathBuf;

use anyhow::Result;

use crate::linker::{linker_config, LinkerConfig};
use crate::ops::load::load_plan;
use crate::util::fs::{read_json, write_json};

/// Options for the linker-config command.
#[derive(Debug, Clone, Default)]
pub struct LinkerOptions {
    /// Saved plan
    pub plan: PathBuf,

    /// Existing linker configuration to extend
    pub base: Option<PathBuf>,

    /// Where to write the configuration (None = don't write)
    pub output: Option<PathBuf>,

    /// Emit the namespace even if nothing needs a shim
    pub force: bool,
}

/// Build the linker configuration for a saved plan.
pub fn generate_linker_config(opts: &LinkerOptions) -> Result<Option<LinkerConfig>> {
    let plan = load_plan(&opts.plan)?;
    let base = match &opts.base {
        Some(path) => Some(read_json::<LinkerConfig>(path)?),
        None => None,
    };

    let config = linker_config(&plan, base, opts.force);

    if let (Some(config), Some(output)) = (&config, &opts.output) {
        write_json(output, config)?;
        tracing::info!("Wrote linker configuration to {}", output.display());
    }

    Ok(config)
}
