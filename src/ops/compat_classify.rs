//! Implementation of `vndk-compat classify`.

use std::path::PathBuf;

use anyhow::Result;

use crate::core::{CompatPlan, Policy};
use crate::diff::DiffEngine;
use crate::ops::load::{load_footprint, load_model, load_policy, load_policy_for_level, save_plan};

/// Options for the classify command.
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// System API model
    pub model: PathBuf,

    /// Vendor footprint
    pub footprint: PathBuf,

    /// Explicit policy file (overrides `policy_dir`)
    pub policy: Option<PathBuf>,

    /// Directory of `v{N}.policy.{json,toml}` files
    pub policy_dir: Option<PathBuf>,

    /// Where to write the plan (None = don't write)
    pub output: Option<PathBuf>,

    /// Number of classification workers
    pub jobs: Option<usize>,
}

/// Classify a footprint and optionally save the plan.
pub fn classify(opts: &ClassifyOptions) -> Result<CompatPlan> {
    let model = load_model(&opts.model)?;
    let footprint = load_footprint(&opts.footprint)?;

    let policy = match (&opts.policy, &opts.policy_dir) {
        (Some(path), _) => load_policy(path)?,
        (None, Some(dir)) => load_policy_for_level(dir, footprint.api_level)?,
        (None, None) => {
            tracing::warn!("No policy given, classifying without rules");
            Policy::empty()
        }
    };

    let plan = DiffEngine::new(&model, &policy)
        .with_jobs(opts.jobs)
        .classify(&footprint)?;

    if let Some(output) = &opts.output {
        save_plan(output, &plan)?;
        tracing::info!("Wrote plan to {}", output.display());
    }

    Ok(plan)
}
