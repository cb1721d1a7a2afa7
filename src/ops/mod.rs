//! High-level operations.
//!
//! This module contains the implementation of vndk-compat commands: the
//! file I/O around the pure engine stages.

pub mod compat_classify;
pub mod compat_linker;
pub mod compat_score;
pub mod compat_shim;
pub mod load;

pub use compat_classify::{classify, ClassifyOptions};
pub use compat_linker::{generate_linker_config, LinkerOptions};
pub use compat_score::{render_score, score_plan, ScoreFormat, ScoreOptions};
pub use compat_shim::{generate_shims, load_requests, ShimOptions, ShimReport};
pub use load::{
    find_policy_file, load_footprint, load_model, load_plan, load_policy, load_policy_for_level,
    save_plan,
};
