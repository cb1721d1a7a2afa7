//! vndk-compat - A compatibility engine for Android vendor interfaces
//!
//! This crate decides, under an explicit versioned policy, which symbols a
//! vendor partition references remain usable against a system partition,
//! scores the result, and synthesizes forwarding shims for the breaks that
//! can be bridged.

pub mod core;
pub mod diff;
pub mod linker;
pub mod ops;
pub mod score;
pub mod shim;
pub mod util;

/// Test fixtures for vndk-compat unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{
    model::ApiModel, plan::CompatPlan, plan::CompatStatus, policy::Policy,
    footprint::VendorFootprint,
};

pub use diff::{classify, DiffEngine};
pub use score::{score, CompatScore};
pub use shim::{generate, generate_batch, ShimRequest};
