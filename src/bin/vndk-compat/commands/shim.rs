//! `vndk-compat shim` command

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::ShimArgs;
use vndk_compat::ops::{generate_shims, load_requests, ShimOptions};
use vndk_compat::shim::ShimRequest;
use vndk_compat::util::diagnostic::emit;
use vndk_compat::util::Config;

pub fn execute(args: ShimArgs, config: &Config, color: bool) -> Result<()> {
    let requests = match (&args.requests, &args.library, &args.compat_version) {
        (Some(path), _, _) => load_requests(path)?,
        (None, Some(library), Some(version)) if args.sorted => {
            vec![ShimRequest::unordered(library, version, &args.symbols)]
        }
        (None, Some(library), Some(version)) => {
            vec![ShimRequest::new(library, version, &args.symbols)]
        }
        _ => bail!("either --requests or --library with --compat-version is required"),
    };

    // Output dir: CLI > config > ./shims
    let output_dir = args
        .output_dir
        .or_else(|| config.shim.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("shims"));

    let report = generate_shims(&ShimOptions {
        model: args.model,
        plan: args.plan,
        requests,
        output_dir,
    })?;

    for path in &report.written {
        println!("{}", path.display());
    }

    for failure in &report.failures {
        emit(&failure.to_diagnostic(), color);
    }

    if !report.is_success() {
        bail!(
            "{} of {} shim requests failed ({} errors)",
            report.failed_requests,
            report.requests,
            report.failures.len()
        );
    }

    Ok(())
}
