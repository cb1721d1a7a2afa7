//! Scoring system: reduces a plan into an advisory compatibility score.
//!
//! Weights are fixed-point thousandths and sums are plain integer
//! additions, so the total is the same for any reduction grouping. The
//! score never aborts anything; callers decide what a `Fail` means.

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;

use crate::core::plan::{CompatPlan, CompatStatus};

/// Default pass threshold.
pub const DEFAULT_THRESHOLD: u32 = 90;

/// Fixed-point scale of status weights (1.0 == 1000).
pub const WEIGHT_SCALE: u64 = 1000;

/// Score at or above which a plan is reported `Degraded` rather than `Unsupported`.
pub const DEGRADED_FLOOR: u32 = 70;

/// Weight of a status, in thousandths.
pub fn weight(status: CompatStatus) -> u64 {
    match status {
        CompatStatus::Compatible | CompatStatus::PolicyExempt => 1000,
        CompatStatus::RequiresShim => 750,
        CompatStatus::VersionMismatch => 250,
        CompatStatus::Missing | CompatStatus::Incompatible => 0,
    }
}

/// Pass/fail against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreResult {
    Pass,
    Fail,
}

impl fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreResult::Pass => write!(f, "PASS"),
            ScoreResult::Fail => write!(f, "FAIL"),
        }
    }
}

/// Coarse compatibility state published alongside the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatState {
    Full,
    Degraded,
    Unsupported,
}

impl CompatState {
    pub fn from_score(score: u32) -> Self {
        if score >= 100 {
            CompatState::Full
        } else if score >= DEGRADED_FLOOR {
            CompatState::Degraded
        } else {
            CompatState::Unsupported
        }
    }
}

impl fmt::Display for CompatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatState::Full => write!(f, "FULL"),
            CompatState::Degraded => write!(f, "DEGRADED"),
            CompatState::Unsupported => write!(f, "UNSUPPORTED"),
        }
    }
}

/// Aggregate score of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatScore {
    /// Number of findings scored
    pub total: usize,
    /// Sum of status weights, in thousandths
    pub compatible_weighted_sum: u64,
    /// 0-100
    pub score: u32,
    pub threshold: u32,
    pub result: ScoreResult,
    pub state: CompatState,
}

impl CompatScore {
    pub fn is_pass(&self) -> bool {
        self.result == ScoreResult::Pass
    }

    /// Flat name/value mapping suitable for build properties.
    pub fn properties(&self) -> BTreeMap<&'static str, String> {
        let mut props = BTreeMap::new();
        props.insert("ro.vndk.compat_score", self.score.to_string());
        props.insert("ro.vndk.compat_state", self.state.to_string());
        props.insert("ro.vndk.compat_result", self.result.to_string());
        props.insert("ro.vndk.compat_threshold", self.threshold.to_string());
        props.insert("ro.vndk.compat_total", self.total.to_string());
        props
    }

    /// Render as a `.prop` file, score and state first.
    pub fn to_properties(&self) -> String {
        let props = self.properties();
        let order = [
            "ro.vndk.compat_score",
            "ro.vndk.compat_state",
            "ro.vndk.compat_result",
            "ro.vndk.compat_threshold",
            "ro.vndk.compat_total",
        ];

        order
            .iter()
            .map(|key| format!("{}={}\n", key, props[key]))
            .collect()
    }
}

impl fmt::Display for CompatScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score {}/100 ({}, threshold {}, {} over {} findings)",
            self.score, self.result, self.threshold, self.state, self.total
        )
    }
}

/// Score `plan` against `threshold`.
///
/// `score = round(weighted_sum * 100 / total)`, with an empty plan scoring
/// 100 (vacuously compatible).
pub fn score(plan: &CompatPlan, threshold: u32) -> CompatScore {
    let total = plan.len();
    let weighted_sum: u64 = plan
        .findings()
        .par_iter()
        .map(|finding| weight(finding.status))
        .sum();

    let score = if total == 0 {
        100
    } else {
        let denominator = total as u64 * WEIGHT_SCALE;
        // Round half up in integer arithmetic
        ((weighted_sum * 100 + denominator / 2) / denominator) as u32
    };

    let result = if score >= threshold {
        ScoreResult::Pass
    } else {
        ScoreResult::Fail
    };

    let compat_score = CompatScore {
        total,
        compatible_weighted_sum: weighted_sum,
        score,
        threshold,
        result,
        state: CompatState::from_score(score),
    };

    tracing::info!("Compatibility {}", compat_score);

    compat_score
}

/// Score with the default threshold.
pub fn score_default(plan: &CompatPlan) -> CompatScore {
    score(plan, DEFAULT_THRESHOLD)
}
