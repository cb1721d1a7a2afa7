//! Fatal input errors: malformed policy and structurally invalid data.
//!
//! Neither of these is ever downgraded to a classification outcome. They
//! abort the diff run before a plan exists.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::symbol::ApiLevel;
use crate::util::diagnostic::Diagnostic;

/// Malformed or self-contradictory policy.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ConfigError {
    #[error("duplicate policy rule id `{id}`")]
    #[diagnostic(
        code(vndk_compat::policy::duplicate_rule),
        help("every rule id must be unique within a policy")
    )]
    DuplicateRuleId {
        id: String,
        first: usize,
        second: usize,
    },

    #[error("rule `{id}` has an invalid api level range [{low}, {high}]")]
    #[diagnostic(
        code(vndk_compat::policy::invalid_range),
        help("write the range as [low, high] with low <= high")
    )]
    InvalidRange {
        id: String,
        low: ApiLevel,
        high: ApiLevel,
    },

    #[error("rule `{id}` has an invalid pattern `{pattern}`: {message}")]
    #[diagnostic(code(vndk_compat::policy::invalid_pattern))]
    InvalidPattern {
        id: String,
        pattern: String,
        message: String,
    },

    #[error("rules `{first}` and `{second}` tie for `{symbol}`")]
    #[diagnostic(
        code(vndk_compat::policy::unresolved_tie),
        help("give one of the rules a higher priority")
    )]
    UnresolvedTie {
        symbol: String,
        first: String,
        second: String,
    },

    #[error("policy targets vendor api level {policy} but the footprint is at level {footprint}")]
    #[diagnostic(code(vndk_compat::policy::level_mismatch))]
    LevelMismatch {
        policy: ApiLevel,
        footprint: ApiLevel,
    },
}

/// Structurally invalid model or footprint.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum DataError {
    #[error("duplicate model entry `{library}:{name}@{version}`")]
    #[diagnostic(code(vndk_compat::model::duplicate_entry))]
    DuplicateModelEntry {
        library: String,
        name: String,
        version: ApiLevel,
    },

    #[error("model symbol `{library}:{name}` belongs to a library missing from the registry")]
    #[diagnostic(code(vndk_compat::model::unregistered_symbol))]
    SymbolOutsideRegistry { library: String, name: String },

    #[error("`{consumer}` references `{library}:{name}` but `{library}` is not in the model's library registry")]
    #[diagnostic(
        code(vndk_compat::footprint::unregistered_library),
        help("regenerate the system model with a registry covering every linked library")
    )]
    UnregisteredLibrary {
        library: String,
        name: String,
        consumer: String,
    },
}

impl ConfigError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::from_miette(self);
        match self {
            ConfigError::DuplicateRuleId { first, second, .. } => diag.with_context(format!(
                "declared at positions {} and {} of the rule list",
                first, second
            )),
            ConfigError::InvalidPattern { .. } => diag
                .with_help("patterns are `library:name` or `name`, each part a literal or a glob"),
            ConfigError::LevelMismatch { footprint, .. } => diag.with_help(format!(
                "use the policy file for vendor api level {}",
                footprint
            )),
            ConfigError::InvalidRange { .. } | ConfigError::UnresolvedTie { .. } => diag,
        }
    }
}

impl DataError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::from_miette(self);
        match self {
            DataError::DuplicateModelEntry { .. } => diag.with_help(
                "each (library, name, version) triple may appear only once in the model",
            ),
            DataError::SymbolOutsideRegistry { library, .. } => {
                diag.with_help(format!("add `{}` to the model registry", library))
            }
            DataError::UnregisteredLibrary { consumer, .. } => {
                diag.with_context(format!("referenced by `{}`", consumer))
            }
        }
    }
}
