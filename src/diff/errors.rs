//! Diff engine error types.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::errors::{ConfigError, DataError};
use crate::util::diagnostic::Diagnostic;

/// Fatal error aborting a diff run before any plan is produced.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum DiffError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Data(#[from] DataError),

    #[error("failed to start classification workers")]
    #[diagnostic(code(vndk_compat::diff::worker_pool))]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl DiffError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            DiffError::Config(err) => err.to_diagnostic(),
            DiffError::Data(err) => err.to_diagnostic(),
            DiffError::WorkerPool(err) => {
                Diagnostic::from_miette(self).with_context(err.to_string())
            }
        }
    }
}
