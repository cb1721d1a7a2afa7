//! Symbol-level compatibility classification.

use rayon::prelude::*;

use crate::core::errors::{ConfigError, DataError};
use crate::core::footprint::{FootprintEntry, VendorFootprint};
use crate::core::model::ApiModel;
use crate::core::plan::{CompatFinding, CompatPlan, CompatStatus};
use crate::core::policy::{Disposition, Policy, PolicyRule};
use crate::core::symbol::{ApiLevel, ApiSymbol, SymbolRef};
use crate::diff::errors::DiffError;

/// Classifies a vendor footprint against a system model under a policy.
///
/// The engine only borrows its inputs; classification is a pure function
/// of the model, the policy and the footprint.
pub struct DiffEngine<'a> {
    model: &'a ApiModel,
    policy: &'a Policy,
    /// Worker count (None = global rayon pool)
    jobs: Option<usize>,
}

impl<'a> DiffEngine<'a> {
    pub fn new(model: &'a ApiModel, policy: &'a Policy) -> Self {
        DiffEngine {
            model,
            policy,
            jobs: None,
        }
    }

    /// Run classification on a dedicated pool of `jobs` workers.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Produce the plan for `footprint`.
    ///
    /// Entries are classified in parallel; each finding lands at its entry's
    /// index, so the plan order never depends on worker scheduling.
    pub fn classify(&self, footprint: &VendorFootprint) -> Result<CompatPlan, DiffError> {
        self.policy.check_vendor_level(footprint.api_level)?;

        for entry in &footprint.entries {
            let symbol = &entry.symbol_ref;
            if !self.model.is_registered(&symbol.library) {
                return Err(DataError::UnregisteredLibrary {
                    library: symbol.library.clone(),
                    name: symbol.name.clone(),
                    consumer: entry.consuming_library.clone(),
                }
                .into());
            }
        }

        let findings = match self.jobs {
            Some(jobs) => {
                let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
                pool.install(|| self.classify_entries(footprint))
            }
            None => self.classify_entries(footprint),
        }?;

        let plan = CompatPlan::new(footprint.api_level, self.model.api_level(), findings);

        tracing::info!(
            "Classified {} references (vendor api {}, system api {}): {}",
            plan.len(),
            plan.vendor_api_level(),
            plan.system_api_level(),
            plan.counts()
        );

        Ok(plan)
    }

    fn classify_entries(&self, footprint: &VendorFootprint) -> Result<Vec<CompatFinding>, ConfigError> {
        let results: Vec<Result<CompatFinding, ConfigError>> = footprint
            .entries
            .par_iter()
            .map(|entry| self.classify_entry(entry, footprint.api_level))
            .collect();

        // First error in footprint order, independent of scheduling
        results.into_iter().collect()
    }

    fn classify_entry(
        &self,
        entry: &FootprintEntry,
        vendor_level: ApiLevel,
    ) -> Result<CompatFinding, ConfigError> {
        let symbol = &entry.symbol_ref;
        let rule = self.policy.select(&symbol.library, &symbol.name, vendor_level)?;

        if let Some(rule) = rule {
            tracing::debug!(
                "{}:{} governed by rule `{}` ({})",
                symbol.library,
                symbol.name,
                rule.id,
                rule.disposition
            );
        }

        let (status, rationale, rule) = match self.model.in_effect(&symbol.library, &symbol.name) {
            None => self.absent(symbol, rule, vendor_level)?,
            Some(provided) if provided.version >= symbol.required_version => (
                CompatStatus::Compatible,
                format!(
                    "compatible: system provides version {} >= required {}{}",
                    provided.version,
                    symbol.required_version,
                    inert_rule_note(rule)
                ),
                rule,
            ),
            Some(provided) => {
                let (status, rationale) = version_break(symbol, provided, rule);
                (status, rationale, rule)
            }
        };

        Ok(CompatFinding {
            symbol_ref: symbol.clone(),
            consuming_library: entry.consuming_library.clone(),
            status,
            rationale,
            matched_rule: rule.map(|r| r.id.clone()),
        })
    }

    /// No version of the symbol is in effect on the system side.
    ///
    /// Only `allow` and `deprecated_ok` decide here, so the strongest of those
    /// wins even when a `deny` or `require_shim` rule outranks it overall.
    fn absent(
        &self,
        symbol: &SymbolRef,
        rule: Option<&'a PolicyRule>,
        vendor_level: ApiLevel,
    ) -> Result<(CompatStatus, String, Option<&'a PolicyRule>), ConfigError> {
        let permitting = match rule {
            Some(rule) if rule.disposition.permits_break() => Some(rule),
            Some(_) => self
                .policy
                .select_permitting(&symbol.library, &symbol.name, vendor_level)?,
            None => None,
        };

        if let Some(permitting) = permitting {
            return Ok((
                CompatStatus::PolicyExempt,
                format!(
                    "policy-exempt: absent from the system, rule `{}` ({}) permits it",
                    permitting.id, permitting.disposition
                ),
                Some(permitting),
            ));
        }

        let reason = if self.model.contains(&symbol.library, &symbol.name) {
            format!(
                "only versions newer than system api level {} exist",
                self.model.api_level()
            )
        } else {
            "not exported by the system".to_string()
        };

        Ok((
            CompatStatus::Missing,
            format!("missing: {}{}", reason, inert_rule_note(rule)),
            rule,
        ))
    }
}

/// The system version in effect is older than the vendor requires.
fn version_break(
    symbol: &SymbolRef,
    provided: &ApiSymbol,
    rule: Option<&PolicyRule>,
) -> (CompatStatus, String) {
    let gap = format!(
        "system version {} < required {}",
        provided.version, symbol.required_version
    );

    match rule {
        Some(rule) => {
            let (status, verdict) = match rule.disposition {
                Disposition::RequireShim => (CompatStatus::RequiresShim, "requests a shim"),
                Disposition::Deny => (CompatStatus::Incompatible, "denies the break"),
                Disposition::Allow | Disposition::DeprecatedOk => {
                    (CompatStatus::PolicyExempt, "permits the break")
                }
            };
            (
                status,
                format!(
                    "{}: {}, rule `{}` ({}) {}",
                    status, gap, rule.id, rule.disposition, verdict
                ),
            )
        }
        None => (
            CompatStatus::VersionMismatch,
            format!("version-mismatch: {}, no rule applies", gap),
        ),
    }
}

fn inert_rule_note(rule: Option<&PolicyRule>) -> String {
    match rule {
        Some(rule) => format!("; rule `{}` ({}) matched without effect", rule.id, rule.disposition),
        None => String::new(),
    }
}

/// Classify `footprint` against `model` under `policy` on the global pool.
pub fn classify(
    model: &ApiModel,
    footprint: &VendorFootprint,
    policy: &Policy,
) -> Result<CompatPlan, DiffError> {
    DiffEngine::new(model, policy).classify(footprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::ApiLevelRange;
    use crate::test_support::fixtures::{entry, function_model, rule};

    #[test]
    fn test_scenario_a_newer_system_is_compatible() {
        let model = function_model(35, &[("libfoo", "foo", 2)]);
        let footprint = VendorFootprint::new(34, vec![entry("libfoo", "foo", 1, "libvendorA")]);

        let plan = classify(&model, &footprint, &Policy::empty()).unwrap();

        assert_eq!(plan.len(), 1);
        let finding = &plan.findings()[0];
        assert_eq!(finding.status, CompatStatus::Compatible);
        assert_eq!(finding.matched_rule, None);
        assert!(finding.rationale.starts_with("compatible:"));
        assert_eq!(finding.consuming_library, "libvendorA");
    }

    #[test]
    fn test_scenario_b_absent_symbol_is_missing() {
        let model = function_model(35, &[]);
        let footprint = VendorFootprint::new(34, vec![entry("libbar", "bar", 1, "libvendorB")]);

        let plan = classify(&model, &footprint, &Policy::empty()).unwrap();

        assert_eq!(plan.findings()[0].status, CompatStatus::Missing);
        assert!(plan.findings()[0].rationale.contains("not exported"));
    }

    #[test]
    fn test_scenario_c_require_shim() {
        let model = function_model(35, &[("libbaz", "baz", 1)]);
        let footprint = VendorFootprint::new(3, vec![entry("libbaz", "baz", 2, "libvendorC")]);
        let policy = Policy::new(
            None,
            vec![rule("r1", "libbaz:baz", (1, 5), Disposition::RequireShim, 1)],
        )
        .unwrap();

        let plan = classify(&model, &footprint, &policy).unwrap();

        let finding = &plan.findings()[0];
        assert_eq!(finding.status, CompatStatus::RequiresShim);
        assert_eq!(finding.matched_rule.as_deref(), Some("r1"));
        assert!(finding.rationale.contains("rule `r1`"));
    }

    #[test]
    fn test_deny_yields_incompatible_only_on_version_break() {
        let model = function_model(35, &[("libq", "old", 1)]);
        let footprint = VendorFootprint::new(
            34,
            vec![
                entry("libq", "old", 3, "libv"),
                entry("libq", "gone", 1, "libv"),
            ],
        );
        let policy = Policy::new(None, vec![rule("no-q", "libq:*", (1, 40), Disposition::Deny, 0)])
            .unwrap();

        let plan = classify(&model, &footprint, &policy).unwrap();

        assert_eq!(plan.findings()[0].status, CompatStatus::Incompatible);
        assert_eq!(plan.findings()[1].status, CompatStatus::Missing);
        assert_eq!(plan.findings()[1].matched_rule.as_deref(), Some("no-q"));
        assert!(plan.findings()[1].rationale.contains("matched without effect"));
    }

    #[test]
    fn test_wildcard_allow_exempts_absent_symbol_under_exact_deny() {
        let model = function_model(35, &[("libq", "old", 1)]);
        let footprint = VendorFootprint::new(
            34,
            vec![
                entry("libq", "gone", 1, "libv"),
                entry("libq", "old", 3, "libv"),
            ],
        );
        let policy = Policy::new(
            None,
            vec![
                rule("deny-gone", "libq:gone", (1, 40), Disposition::Deny, 0),
                rule("deny-old", "libq:old", (1, 40), Disposition::Deny, 0),
                rule("allow-q", "libq:*", (1, 40), Disposition::Allow, 0),
            ],
        )
        .unwrap();

        let plan = classify(&model, &footprint, &policy).unwrap();

        let gone = &plan.findings()[0];
        assert_eq!(gone.status, CompatStatus::PolicyExempt);
        assert_eq!(gone.matched_rule.as_deref(), Some("allow-q"));
        assert!(gone.rationale.contains("rule `allow-q` (allow) permits it"));

        // A version break is still decided by the top rule
        let old = &plan.findings()[1];
        assert_eq!(old.status, CompatStatus::Incompatible);
        assert_eq!(old.matched_rule.as_deref(), Some("deny-old"));
    }

    #[test]
    fn test_allow_and_deprecated_ok_exempt() {
        let model = function_model(35, &[("libold", "legacy", 1)]);
        let footprint = VendorFootprint::new(
            34,
            vec![
                entry("libold", "legacy", 4, "libv"),
                entry("libold", "removed", 1, "libv"),
            ],
        );
        let policy = Policy::new(
            None,
            vec![
                rule("dep", "libold:legacy", (1, 40), Disposition::DeprecatedOk, 0),
                rule("allow", "libold:removed", (1, 40), Disposition::Allow, 0),
            ],
        )
        .unwrap();

        let plan = classify(&model, &footprint, &policy).unwrap();
        assert_eq!(plan.findings()[0].status, CompatStatus::PolicyExempt);
        assert_eq!(plan.findings()[1].status, CompatStatus::PolicyExempt);
    }

    #[test]
    fn test_no_rule_version_mismatch() {
        let model = function_model(35, &[("libm2", "f", 2)]);
        let footprint = VendorFootprint::new(34, vec![entry("libm2", "f", 5, "libv")]);

        let plan = classify(&model, &footprint, &Policy::empty()).unwrap();
        assert_eq!(plan.findings()[0].status, CompatStatus::VersionMismatch);
    }

    #[test]
    fn test_future_only_symbol_counts_as_absent() {
        let model = function_model(30, &[("libnew", "shiny", 33)]);
        let footprint = VendorFootprint::new(30, vec![entry("libnew", "shiny", 1, "libv")]);

        let plan = classify(&model, &footprint, &Policy::empty()).unwrap();
        let finding = &plan.findings()[0];
        assert_eq!(finding.status, CompatStatus::Missing);
        assert!(finding.rationale.contains("newer than system api level 30"));
    }

    #[test]
    fn test_backward_compat_ignores_policy() {
        let model = function_model(35, &[("liba", "x", 10), ("liba", "y", 10)]);
        let footprint = VendorFootprint::new(
            34,
            vec![entry("liba", "x", 3, "libv"), entry("liba", "y", 10, "libv")],
        );
        let policy = Policy::new(
            None,
            vec![
                rule("deny-x", "liba:x", (1, 40), Disposition::Deny, 9),
                rule("shim-all", "*", (1, 40), Disposition::RequireShim, 0),
            ],
        )
        .unwrap();

        let plan = classify(&model, &footprint, &policy).unwrap();
        assert!(plan
            .findings()
            .iter()
            .all(|f| f.status == CompatStatus::Compatible));
    }

    #[test]
    fn test_exact_low_priority_beats_wildcard_high_priority() {
        let model = function_model(35, &[("libp", "f", 1)]);
        let footprint = VendorFootprint::new(34, vec![entry("libp", "f", 2, "libv")]);
        let policy = Policy::new(
            None,
            vec![
                rule("wild", "libp:*", (1, 40), Disposition::Deny, 100),
                rule("exact", "libp:f", (1, 40), Disposition::RequireShim, 0),
            ],
        )
        .unwrap();

        let plan = classify(&model, &footprint, &policy).unwrap();
        assert_eq!(plan.findings()[0].status, CompatStatus::RequiresShim);
        assert_eq!(plan.findings()[0].matched_rule.as_deref(), Some("exact"));
    }

    #[test]
    fn test_unregistered_library_aborts() {
        let model = ApiModel::with_registry(35, ["libfoo"], Vec::new()).unwrap();
        let footprint = VendorFootprint::new(
            34,
            vec![
                entry("libfoo", "foo", 1, "libv"),
                entry("libghost", "boo", 1, "libvendorZ"),
            ],
        );

        let err = classify(&model, &footprint, &Policy::empty()).unwrap_err();
        match err {
            DiffError::Data(DataError::UnregisteredLibrary {
                library, consumer, ..
            }) => {
                assert_eq!(library, "libghost");
                assert_eq!(consumer, "libvendorZ");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registered_library_without_symbol_is_missing() {
        let model = ApiModel::with_registry(35, ["libfoo"], Vec::new()).unwrap();
        let footprint = VendorFootprint::new(34, vec![entry("libfoo", "foo", 1, "libv")]);

        let plan = classify(&model, &footprint, &Policy::empty()).unwrap();
        assert_eq!(plan.findings()[0].status, CompatStatus::Missing);
    }

    #[test]
    fn test_policy_level_mismatch_aborts() {
        let model = function_model(35, &[]);
        let footprint = VendorFootprint::new(33, vec![entry("liba", "a", 1, "libv")]);
        let policy = Policy::new(Some(34), Vec::new()).unwrap();

        let err = classify(&model, &footprint, &policy).unwrap_err();
        assert!(matches!(
            err,
            DiffError::Config(ConfigError::LevelMismatch { policy: 34, footprint: 33 })
        ));
    }

    #[test]
    fn test_deterministic_across_pool_sizes() {
        let symbols: Vec<(String, String, u32)> = (0..200)
            .map(|i| (format!("lib{}", i % 7), format!("sym_{}", i), (i % 5) as u32))
            .collect();
        let refs: Vec<(&str, &str, u32)> = symbols
            .iter()
            .map(|(l, n, v)| (l.as_str(), n.as_str(), *v))
            .collect();
        let model = function_model(35, &refs);

        let entries = (0..300)
            .map(|i| entry(&format!("lib{}", i % 7), &format!("sym_{}", i), (i % 6) as u32, "libv"))
            .collect();
        let footprint = VendorFootprint::new(34, entries);
        let policy = Policy::new(
            None,
            vec![
                rule("shim-odd", "sym_*1", (1, 40), Disposition::RequireShim, 1),
                PolicyRule::new("deny-lib3", "lib3:*", ApiLevelRange::new(30, 34), Disposition::Deny, 2),
            ],
        )
        .unwrap();

        let single = DiffEngine::new(&model, &policy)
            .with_jobs(Some(1))
            .classify(&footprint)
            .unwrap();
        let many = DiffEngine::new(&model, &policy)
            .with_jobs(Some(8))
            .classify(&footprint)
            .unwrap();
        let global = classify(&model, &footprint, &policy).unwrap();

        assert_eq!(single.len(), footprint.len());
        assert_eq!(single, many);
        assert_eq!(
            serde_json::to_string(&single).unwrap(),
            serde_json::to_string(&global).unwrap()
        );

        for (finding, entry) in single.findings().iter().zip(&footprint.entries) {
            assert_eq!(finding.symbol_ref, entry.symbol_ref);
        }
    }
}
