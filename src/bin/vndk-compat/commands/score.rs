//! `vndk-compat score` command

use anyhow::{anyhow, bail, Result};

use crate::cli::ScoreArgs;
use vndk_compat::ops::{score_plan, ScoreFormat, ScoreOptions};
use vndk_compat::util::Config;

pub fn execute(args: ScoreArgs, config: &Config) -> Result<()> {
    let format = args
        .format
        .parse::<ScoreFormat>()
        .map_err(|e| anyhow!("{}", e))?;

    let opts = ScoreOptions {
        plan: args.plan,
        // Threshold: CLI > config > default
        threshold: args.threshold.unwrap_or_else(|| config.threshold()),
        format,
        output: args.output.clone(),
    };

    let (compat_score, rendered) = score_plan(&opts)?;

    if args.output.is_none() {
        print!("{}", rendered);
    }

    if args.enforce && !compat_score.is_pass() {
        bail!(
            "compatibility score {} is below the threshold of {}",
            compat_score.score,
            compat_score.threshold
        );
    }

    Ok(())
}
