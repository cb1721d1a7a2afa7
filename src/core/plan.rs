//! The compatibility plan: one finding per footprint entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::symbol::{ApiLevel, SymbolRef};

/// Current on-disk plan format.
pub const PLAN_FORMAT_VERSION: u32 = 1;

/// Classification of one footprint entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompatStatus {
    Compatible,
    Missing,
    VersionMismatch,
    PolicyExempt,
    RequiresShim,
    Incompatible,
}

impl CompatStatus {
    pub const ALL: [CompatStatus; 6] = [
        CompatStatus::Compatible,
        CompatStatus::Missing,
        CompatStatus::VersionMismatch,
        CompatStatus::PolicyExempt,
        CompatStatus::RequiresShim,
        CompatStatus::Incompatible,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompatStatus::Compatible => "compatible",
            CompatStatus::Missing => "missing",
            CompatStatus::VersionMismatch => "version-mismatch",
            CompatStatus::PolicyExempt => "policy-exempt",
            CompatStatus::RequiresShim => "requires-shim",
            CompatStatus::Incompatible => "incompatible",
        }
    }
}

impl fmt::Display for CompatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The decision for one footprint entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatFinding {
    pub symbol_ref: SymbolRef,
    pub consuming_library: String,
    pub status: CompatStatus,
    /// Which branch fired, and under which rule
    pub rationale: String,
    pub matched_rule: Option<String>,
}

/// Number of findings per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub compatible: usize,
    pub missing: usize,
    pub version_mismatch: usize,
    pub policy_exempt: usize,
    pub requires_shim: usize,
    pub incompatible: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: CompatStatus) {
        match status {
            CompatStatus::Compatible => self.compatible += 1,
            CompatStatus::Missing => self.missing += 1,
            CompatStatus::VersionMismatch => self.version_mismatch += 1,
            CompatStatus::PolicyExempt => self.policy_exempt += 1,
            CompatStatus::RequiresShim => self.requires_shim += 1,
            CompatStatus::Incompatible => self.incompatible += 1,
        }
    }

    pub fn get(&self, status: CompatStatus) -> usize {
        match status {
            CompatStatus::Compatible => self.compatible,
            CompatStatus::Missing => self.missing,
            CompatStatus::VersionMismatch => self.version_mismatch,
            CompatStatus::PolicyExempt => self.policy_exempt,
            CompatStatus::RequiresShim => self.requires_shim,
            CompatStatus::Incompatible => self.incompatible,
        }
    }

    pub fn total(&self) -> usize {
        CompatStatus::ALL.iter().map(|s| self.get(*s)).sum()
    }
}

impl fmt::Display for StatusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = CompatStatus::ALL
            .iter()
            .map(|s| format!("{} {}", self.get(*s), s))
            .collect();
        f.write_str(&parts.join(", "))
    }
}

/// Ordered findings for one `(vendor, system)` API level pair.
///
/// Produced once per diff run and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatPlan {
    format_version: u32,
    vendor_api_level: ApiLevel,
    system_api_level: ApiLevel,
    findings: Vec<CompatFinding>,
}

impl CompatPlan {
    pub fn new(
        vendor_api_level: ApiLevel,
        system_api_level: ApiLevel,
        findings: Vec<CompatFinding>,
    ) -> Self {
        CompatPlan {
            format_version: PLAN_FORMAT_VERSION,
            vendor_api_level,
            system_api_level,
            findings,
        }
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Whether this build can read the plan.
    pub fn is_compatible(&self) -> bool {
        self.format_version == PLAN_FORMAT_VERSION
    }

    pub fn vendor_api_level(&self) -> ApiLevel {
        self.vendor_api_level
    }

    pub fn system_api_level(&self) -> ApiLevel {
        self.system_api_level
    }

    /// Findings in footprint order.
    pub fn findings(&self) -> &[CompatFinding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings about `library:name`, in plan order.
    pub fn findings_for<'a>(
        &'a self,
        library: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a CompatFinding> + 'a {
        self.findings
            .iter()
            .filter(move |f| f.symbol_ref.library == library && f.symbol_ref.name == name)
    }

    /// Findings with the given status, in plan order.
    pub fn with_status(&self, status: CompatStatus) -> impl Iterator<Item = &CompatFinding> {
        self.findings.iter().filter(move |f| f.status == status)
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for finding in &self.findings {
            counts.record(finding.status);
        }
        counts
    }
}
