//! The vendor partition's referenced symbols.

use serde::{Deserialize, Serialize};

use crate::core::symbol::{ApiLevel, SymbolRef};

/// One symbol reference made by a vendor library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootprintEntry {
    #[serde(flatten)]
    pub symbol_ref: SymbolRef,

    /// The vendor library holding the reference
    pub consuming_library: String,
}

impl FootprintEntry {
    pub fn new(symbol_ref: SymbolRef, consuming_library: impl Into<String>) -> Self {
        FootprintEntry {
            symbol_ref,
            consuming_library: consuming_library.into(),
        }
    }
}

/// Ordered footprint scoped to one vendor API level.
///
/// Order is significant: the plan mirrors it entry for entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorFootprint {
    pub api_level: ApiLevel,

    #[serde(default)]
    pub entries: Vec<FootprintEntry>,
}

impl VendorFootprint {
    pub fn new(api_level: ApiLevel, entries: Vec<FootprintEntry>) -> Self {
        VendorFootprint { api_level, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
