//! Typed shim descriptions.
//!
//! A [`ShimRequest`] is what the caller asks for. A [`ShimSpec`] is the
//! validated, fully resolved form the renderer consumes.

use serde::{Deserialize, Serialize};

use crate::core::symbol::{ApiLevel, SymbolKind};
use crate::shim::errors::ShimError;

/// Prefix of every internal forwarder name.
pub const INTERNAL_PREFIX: &str = "vndk_compat";

/// Caller-declared shim request for one `(target_library, compat_version)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShimRequest {
    pub target_library: String,
    pub compat_version: String,
    pub symbols: Vec<String>,
}

impl ShimRequest {
    /// A request emitting symbols in the given order.
    pub fn new<S: Into<String>>(
        target_library: impl Into<String>,
        compat_version: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) -> Self {
        ShimRequest {
            target_library: target_library.into(),
            compat_version: compat_version.into(),
            symbols: symbols.into_iter().map(Into::into).collect(),
        }
    }

    /// A request over an unordered set of names, emitted in canonical order.
    pub fn unordered<S: Into<String>>(
        target_library: impl Into<String>,
        compat_version: impl Into<String>,
        symbols: impl IntoIterator<Item = S>,
    ) -> Self {
        let mut request = ShimRequest::new(target_library, compat_version, symbols);
        request.symbols.sort();
        request.symbols.dedup();
        request
    }

    /// Requested names with duplicates removed, first occurrence kept.
    pub fn distinct_symbols(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.symbols
            .iter()
            .map(String::as_str)
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Artifact name for this pair.
    pub fn file_name(&self) -> String {
        format!("{}_{}_compat.cpp", self.target_library, self.compat_version)
    }
}

/// How the forwarder reaches the live implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureClass {
    Function,
    VtableSlot,
}

impl SignatureClass {
    /// Signature class for a symbol kind. Data symbols have none.
    pub fn for_kind(kind: SymbolKind) -> Option<Self> {
        match kind {
            SymbolKind::Function => Some(SignatureClass::Function),
            SymbolKind::VtableSlot => Some(SignatureClass::VtableSlot),
            SymbolKind::Variable => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureClass::Function => "function",
            SignatureClass::VtableSlot => "vtable slot",
        }
    }
}

/// One forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimEntry {
    /// Name the vendor binary binds to, under the compat version node
    pub public_name: String,
    /// Name of the local trampoline, never exported as a default symbol
    pub internal_name: String,
    /// Name of the ifunc resolver backing the trampoline
    pub resolver_name: String,
    pub signature: SignatureClass,
    /// Version of the implementation the trampoline resolves to
    pub live_version: ApiLevel,
}

impl ShimEntry {
    pub fn new(
        compat_version: &str,
        name: &str,
        signature: SignatureClass,
        live_version: ApiLevel,
    ) -> Self {
        ShimEntry {
            public_name: name.to_string(),
            internal_name: internal_name(compat_version, name),
            resolver_name: resolver_name(compat_version, name),
            signature,
            live_version,
        }
    }
}

/// `vndk_compat_fwd_<version>__<name>`
///
/// Distinct `(compat_version, name)` pairs always get distinct names. See
/// [`encode_version`].
pub fn internal_name(compat_version: &str, name: &str) -> String {
    format!(
        "{}_fwd_{}__{}",
        INTERNAL_PREFIX,
        encode_version(compat_version),
        name
    )
}

/// `vndk_compat_res_<version>__<name>`
pub fn resolver_name(compat_version: &str, name: &str) -> String {
    format!(
        "{}_res_{}__{}",
        INTERNAL_PREFIX,
        encode_version(compat_version),
        name
    )
}

/// Escape a version node into identifier characters: `_` becomes `_u` and
/// `.` becomes `_d`. The result never contains `__`, so the first `__` after
/// it always marks where the symbol name starts.
fn encode_version(compat_version: &str) -> String {
    let mut encoded = String::with_capacity(compat_version.len());
    for c in compat_version.chars() {
        match c {
            '_' => encoded.push_str("_u"),
            '.' => encoded.push_str("_d"),
            c => encoded.push(c),
        }
    }
    encoded
}

/// A validated shim, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimSpec {
    pub target_library: String,
    pub compat_version: String,
    /// Shared object the forwarders resolve against
    pub live_soname: String,
    /// Fingerprint of the model the shim was generated from
    pub model_fingerprint: String,
    pub entries: Vec<ShimEntry>,
}

/// One emitted translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedShimSource {
    pub file_name: String,
    pub contents: String,
}

/// Result of one request whose version and symbol list were valid.
///
/// Symbols fail independently: `source` forwards every symbol that resolved
/// and is `None` only when none did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShimOutcome {
    pub source: Option<GeneratedShimSource>,
    /// Per-symbol errors, in request order
    pub failures: Vec<ShimError>,
}

impl ShimOutcome {
    /// Whether every requested symbol was forwarded.
    pub fn is_complete(&self) -> bool {
        self.source.is_some() && self.failures.is_empty()
    }
}
