//! `vndk-compat linker-config` command

use anyhow::{Context, Result};

use crate::cli::LinkerConfigArgs;
use vndk_compat::ops::{generate_linker_config, LinkerOptions};

pub fn execute(args: LinkerConfigArgs) -> Result<()> {
    let opts = LinkerOptions {
        plan: args.plan,
        base: args.base,
        output: args.output.clone(),
        force: args.force,
    };

    match generate_linker_config(&opts)? {
        Some(config) if args.output.is_none() => {
            let json = serde_json::to_string_pretty(&config)
                .context("failed to serialize linker configuration")?;
            println!("{}", json);
        }
        Some(_) => {}
        None => eprintln!("No finding requires a shim; no linker namespace emitted"),
    }

    Ok(())
}
