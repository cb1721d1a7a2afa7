//! Test fixtures for common test scenarios.

use std::path::{Path, PathBuf};

use crate::core::footprint::{FootprintEntry, VendorFootprint};
use crate::core::model::ApiModel;
use crate::core::policy::{ApiLevelRange, Disposition, Policy, PolicyRule};
use crate::core::symbol::{ApiLevel, ApiSymbol, SymbolRef};

/// A model of function symbols, `(library, name, version)` each.
pub fn function_model(api_level: ApiLevel, symbols: &[(&str, &str, u32)]) -> ApiModel {
    ApiModel::new(
        api_level,
        symbols
            .iter()
            .map(|(library, name, version)| ApiSymbol::function(*library, *name, *version)),
    )
    .expect("fixture model must be valid")
}

/// A footprint entry.
pub fn entry(library: &str, name: &str, required_version: u32, consumer: &str) -> FootprintEntry {
    FootprintEntry::new(SymbolRef::new(library, name, required_version), consumer)
}

/// A policy rule over an inclusive `(low, high)` level range.
pub fn rule(
    id: &str,
    pattern: &str,
    (low, high): (ApiLevel, ApiLevel),
    disposition: Disposition,
    priority: i32,
) -> PolicyRule {
    PolicyRule::new(id, pattern, ApiLevelRange::new(low, high), disposition, priority)
}

/// Inputs of the "require shim" scenario: `libbaz:baz` at version 1 on the
/// system, required at version 2 by the vendor, bridged by rule `r1`.
pub struct ShimScenario {
    pub model: ApiModel,
    pub footprint: VendorFootprint,
    pub policy: Policy,
}

impl ShimScenario {
    pub fn new() -> Self {
        ShimScenario {
            model: function_model(35, &[("libbaz", "baz", 1)]),
            footprint: VendorFootprint::new(3, vec![entry("libbaz", "baz", 2, "libvendorC")]),
            policy: Policy::new(
                None,
                vec![rule("r1", "libbaz:baz", (1, 5), Disposition::RequireShim, 1)],
            )
            .expect("fixture policy must be valid"),
        }
    }

    /// Write the scenario's model, footprint and policy as JSON under `dir`.
    pub fn write_to(&self, dir: &Path) -> ScenarioPaths {
        let paths = ScenarioPaths {
            model: dir.join("system.model.json"),
            footprint: dir.join("vendor.footprint.json"),
            policy: dir.join("v3.policy.json"),
        };
        std::fs::write(&paths.model, serde_json::to_string(&self.model).unwrap()).unwrap();
        std::fs::write(&paths.footprint, serde_json::to_string(&self.footprint).unwrap()).unwrap();
        std::fs::write(&paths.policy, serde_json::to_string(&self.policy).unwrap()).unwrap();
        paths
    }
}

impl Default for ShimScenario {
    fn default() -> Self {
        ShimScenario::new()
    }
}

/// Locations of a scenario written to disk.
pub struct ScenarioPaths {
    pub model: PathBuf,
    pub footprint: PathBuf,
    pub policy: PathBuf,
}
