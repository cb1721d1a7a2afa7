//! Core data structures for vndk-compat.
//!
//! This module contains the immutable inputs and outputs of the engine:
//! - Symbol identities and the system API model
//! - The vendor footprint
//! - The compatibility policy and its rule ordering
//! - The compatibility plan

pub mod errors;
pub mod footprint;
pub mod model;
pub mod plan;
pub mod policy;
pub mod symbol;

pub use errors::{ConfigError, DataError};
pub use footprint::{FootprintEntry, VendorFootprint};
pub use model::{ApiModel, ApiModelFile};
pub use plan::{CompatFinding, CompatPlan, CompatStatus, StatusCounts, PLAN_FORMAT_VERSION};
pub use policy::{
    ApiLevelRange, Disposition, Policy, PolicyFile, PolicyRule, RulePattern,
};
pub use symbol::{ApiLevel, ApiSymbol, SymbolKey, SymbolKind, SymbolRef};
