//! Implementation of `vndk-compat shim`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::ops::load::{load_model, load_plan};
use crate::shim::{generate_batch, ShimError, ShimRequest};
use crate::util::fs::{read_json, write_string};

/// Options for the shim command.
#[derive(Debug, Clone, Default)]
pub struct ShimOptions {
    /// System API model
    pub model: PathBuf,

    /// Saved plan
    pub plan: PathBuf,

    /// Requests to generate
    pub requests: Vec<ShimRequest>,

    /// Directory the sources are written to
    pub output_dir: PathBuf,
}

/// Outcome of a shim run.
#[derive(Debug, Default)]
pub struct ShimReport {
    /// Number of requests processed
    pub requests: usize,

    /// Written source files, in request order
    pub written: Vec<PathBuf>,

    /// Rejected requests and skipped symbols, in request order
    pub failures: Vec<ShimError>,

    /// Requests that left at least one symbol unforwarded
    pub failed_requests: usize,
}

impl ShimReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RequestFile {
    Many(Vec<ShimRequest>),
    One(ShimRequest),
}

/// Load shim requests from a JSON file holding one request or an array.
pub fn load_requests(path: &Path) -> Result<Vec<ShimRequest>> {
    let requests = match read_json::<RequestFile>(path)? {
        RequestFile::Many(requests) => requests,
        RequestFile::One(request) => vec![request],
    };
    Ok(requests)
}

/// Generate every request and write the successful ones.
pub fn generate_shims(opts: &ShimOptions) -> Result<ShimReport> {
    if opts.requests.is_empty() {
        bail!("no shim requests given");
    }

    let model = load_model(&opts.model)?;
    let plan = load_plan(&opts.plan)?;

    let mut report = ShimReport {
        requests: opts.requests.len(),
        ..ShimReport::default()
    };

    for result in generate_batch(&model, &plan, &opts.requests) {
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("{}", err);
                report.failures.push(err);
                report.failed_requests += 1;
                continue;
            }
        };

        if !outcome.is_complete() {
            report.failed_requests += 1;
        }

        if let Some(source) = outcome.source {
            let path = opts.output_dir.join(&source.file_name);
            write_string(&path, &source.contents)?;
            tracing::info!("Wrote {}", path.display());
            report.written.push(path);
        }

        for err in outcome.failures {
            tracing::warn!("{}", err);
            report.failures.push(err);
        }
    }

    Ok(report)
}
