//! Test utilities for vndk-compat unit tests.
//!
//! Builders for models, footprints and policies so tests can state a
//! scenario in a line or two.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::fixtures::{entry, function_model};
//!
//! let model = function_model(35, &[("libfoo", "foo", 2)]);
//! let footprint = VendorFootprint::new(34, vec![entry("libfoo", "foo", 1, "libvendorA")]);
//! ```

pub mod fixtures;

pub use fixtures::*;
