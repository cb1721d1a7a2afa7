//! Diff engine: classifies every vendor symbol reference against the
//! system API model under a compatibility policy.
//!
//! For each footprint entry the engine resolves the governing policy rule,
//! looks up the version in effect on the system side, and records exactly
//! one finding. Per-symbol problems (`Missing`, `VersionMismatch`,
//! `Incompatible`) are findings, not errors; only malformed policy or
//! structurally invalid data abort a run.

pub mod engine;
pub mod errors;

pub use engine::{classify, DiffEngine};
pub use errors::DiffError;
