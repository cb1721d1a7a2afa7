//! Shim generation errors. Each one is fatal to a single request only.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::symbol::SymbolKind;
use crate::util::diagnostic::Diagnostic;

#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum ShimError {
    #[error("cannot shim `{library}:{symbol}`: symbol is absent from the system model")]
    #[diagnostic(
        code(vndk_compat::shim::unresolved_symbol),
        help("a shim can only forward to a symbol the system still exports")
    )]
    UnresolvedSymbol { library: String, symbol: String },

    #[error("cannot shim `{library}:{symbol}`: policy rule `{rule}` denies it")]
    #[diagnostic(code(vndk_compat::shim::denied))]
    Denied {
        library: String,
        symbol: String,
        rule: String,
    },

    #[error("cannot shim `{library}:{symbol}`: {kind} symbols cannot be forwarded")]
    #[diagnostic(
        code(vndk_compat::shim::unsupported_kind),
        help("only functions and vtable slots can be bridged by a trampoline")
    )]
    UnsupportedKind {
        library: String,
        symbol: String,
        kind: SymbolKind,
    },

    #[error("invalid symbol name `{name}` in shim request")]
    #[diagnostic(
        code(vndk_compat::shim::invalid_name),
        help("symbol names must be C identifiers")
    )]
    InvalidName { name: String },

    #[error("invalid compat version `{compat_version}`")]
    #[diagnostic(
        code(vndk_compat::shim::invalid_version),
        help("version nodes start with a letter or `_` and contain only letters, digits, `_` or `.`")
    )]
    InvalidVersion { compat_version: String },

    #[error("duplicate shim request for `{library}` at `{compat_version}`")]
    #[diagnostic(
        code(vndk_compat::shim::duplicate_request),
        help("merge the symbol lists into one request")
    )]
    DuplicateRequest {
        library: String,
        compat_version: String,
    },

    #[error("shim request for `{library}` at `{compat_version}` names no symbols")]
    #[diagnostic(code(vndk_compat::shim::empty_request))]
    EmptyRequest {
        library: String,
        compat_version: String,
    },
}

impl ShimError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::from_miette(self);
        match self {
            ShimError::UnresolvedSymbol { library, .. } => diag
                .with_context(format!("no version of the symbol is recorded under `{}`", library))
                .with_help("remove the symbol from the request or add it to the system model"),
            ShimError::Denied { rule, .. } => diag
                .with_context(format!("the plan classifies it as incompatible under `{}`", rule))
                .with_help("change the rule disposition to `require_shim` to allow bridging"),
            _ => diag,
        }
    }
}
