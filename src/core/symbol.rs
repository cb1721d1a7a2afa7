//! Symbol identities shared by the model, the footprint and the plan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A system or vendor interface generation.
pub type ApiLevel = u32;

/// What a symbol is, as recorded by the model provider.
///
/// The kind decides which signature class a shim forwarder gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymbolKind {
    Function,
    Variable,
    VtableSlot,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Variable => "variable",
            SymbolKind::VtableSlot => "vtable-slot",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a symbol kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolKindParseError(pub String);

impl fmt::Display for SymbolKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid symbol kind '{}', valid values: function, variable, vtable-slot",
            self.0
        )
    }
}

impl std::error::Error for SymbolKindParseError {}

impl FromStr for SymbolKind {
    type Err = SymbolKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "function" => Ok(SymbolKind::Function),
            "variable" => Ok(SymbolKind::Variable),
            "vtable-slot" | "vtable_slot" => Ok(SymbolKind::VtableSlot),
            _ => Err(SymbolKindParseError(s.to_string())),
        }
    }
}

/// Identity of a symbol: the library exporting it and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolKey {
    pub library: String,
    pub name: String,
}

impl SymbolKey {
    pub fn new(library: impl Into<String>, name: impl Into<String>) -> Self {
        SymbolKey {
            library: library.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.library, self.name)
    }
}

/// One exported version of a system symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiSymbol {
    pub library: String,
    pub name: String,
    pub version: ApiLevel,
    pub kind: SymbolKind,
}

impl ApiSymbol {
    pub fn new(
        library: impl Into<String>,
        name: impl Into<String>,
        version: ApiLevel,
        kind: SymbolKind,
    ) -> Self {
        ApiSymbol {
            library: library.into(),
            name: name.into(),
            version,
            kind,
        }
    }

    /// Shorthand for a function symbol.
    pub fn function(library: impl Into<String>, name: impl Into<String>, version: ApiLevel) -> Self {
        ApiSymbol::new(library, name, version, SymbolKind::Function)
    }

    pub fn key(&self) -> SymbolKey {
        SymbolKey::new(&self.library, &self.name)
    }
}

impl fmt::Display for ApiSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.library, self.name, self.version)
    }
}

/// A vendor-side reference to a system symbol at a required version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolRef {
    pub library: String,
    pub name: String,
    pub required_version: ApiLevel,
}

impl SymbolRef {
    pub fn new(library: impl Into<String>, name: impl Into<String>, required_version: ApiLevel) -> Self {
        SymbolRef {
            library: library.into(),
            name: name.into(),
            required_version,
        }
    }

    pub fn key(&self) -> SymbolKey {
        SymbolKey::new(&self.library, &self.name)
    }
}

impl fmt::Display for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.library, self.name, self.required_version)
    }
}
