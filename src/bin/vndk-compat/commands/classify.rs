//! `vndk-compat classify` command

use anyhow::{Context, Result};

use crate::cli::ClassifyArgs;
use vndk_compat::core::CompatStatus;
use vndk_compat::ops::{classify, ClassifyOptions};
use vndk_compat::util::Config;

pub fn execute(args: ClassifyArgs, config: &Config) -> Result<()> {
    // Policy: --policy > --policy-dir > config
    let policy_dir = if args.policy.is_none() {
        args.policy_dir.or_else(|| config.policy.dir.clone())
    } else {
        None
    };

    let opts = ClassifyOptions {
        model: args.model,
        footprint: args.footprint,
        policy: args.policy,
        policy_dir,
        output: args.output.clone(),
        // Jobs: CLI > config > None (rayon default)
        jobs: args.jobs.or(config.engine.jobs),
    };

    let plan = classify(&opts)?;

    for finding in plan.findings() {
        if finding.status != CompatStatus::Compatible {
            eprintln!(
                "{:>16} {} ({}): {}",
                finding.status, finding.symbol_ref, finding.consuming_library, finding.rationale
            );
        }
    }
    eprintln!("{}", plan.counts());

    if args.output.is_none() {
        let json = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        println!("{}", json);
    }

    Ok(())
}
