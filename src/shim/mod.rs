//! Shim generator.
//!
//! Consumes a plan and an explicit request, and synthesizes forwarding code
//! that keeps an old ABI entry point alive by delegating to the current
//! implementation. Symbols are resolved independently in parallel: one that
//! fails is reported and left out, and the rest are still forwarded.

pub mod errors;
pub mod render;
pub mod spec;

use std::collections::HashSet;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use crate::core::model::ApiModel;
use crate::core::plan::{CompatPlan, CompatStatus};

pub use errors::ShimError;
pub use render::render;
pub use spec::{
    GeneratedShimSource, ShimEntry, ShimOutcome, ShimRequest, ShimSpec, SignatureClass,
};

static C_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

static VERSION_NODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("valid regex"));

/// Generate the shim source for one request.
///
/// Fails outright only when the request itself is invalid. Symbol errors are
/// collected in the outcome, and no artifact is produced when every symbol
/// fails.
pub fn generate(
    model: &ApiModel,
    plan: &CompatPlan,
    request: &ShimRequest,
) -> Result<ShimOutcome, ShimError> {
    let (spec, failures) = build_spec(model, plan, request)?;

    for failure in &failures {
        tracing::debug!("Skipping forwarder: {}", failure);
    }

    if spec.entries.is_empty() {
        tracing::debug!(
            "No forwarders for {} at {}, no source generated",
            request.target_library,
            request.compat_version
        );
        return Ok(ShimOutcome {
            source: None,
            failures,
        });
    }

    let contents = render(&spec);

    tracing::debug!(
        "Generated {} forwarders for {} at {}",
        spec.entries.len(),
        request.target_library,
        request.compat_version
    );

    Ok(ShimOutcome {
        source: Some(GeneratedShimSource {
            file_name: request.file_name(),
            contents,
        }),
        failures,
    })
}

/// Generate many requests, isolating failures per request.
///
/// Results are in request order. A request repeating an earlier
/// `(target_library, compat_version)` pair fails with `DuplicateRequest`.
pub fn generate_batch(
    model: &ApiModel,
    plan: &CompatPlan,
    requests: &[ShimRequest],
) -> Vec<Result<ShimOutcome, ShimError>> {
    let mut seen = HashSet::new();
    let duplicate: Vec<bool> = requests
        .iter()
        .map(|r| !seen.insert((r.target_library.as_str(), r.compat_version.as_str())))
        .collect();

    requests
        .par_iter()
        .zip(duplicate.par_iter())
        .map(|(request, duplicate)| {
            if *duplicate {
                return Err(ShimError::DuplicateRequest {
                    library: request.target_library.clone(),
                    compat_version: request.compat_version.clone(),
                });
            }
            generate(model, plan, request)
        })
        .collect()
}

/// Validate `request` and resolve each of its symbols.
///
/// Returns a [`ShimSpec`] over the symbols that resolved, plus one error per
/// symbol that did not, both in request order.
pub fn build_spec(
    model: &ApiModel,
    plan: &CompatPlan,
    request: &ShimRequest,
) -> Result<(ShimSpec, Vec<ShimError>), ShimError> {
    let symbols = request.distinct_symbols();
    if symbols.is_empty() {
        return Err(ShimError::EmptyRequest {
            library: request.target_library.clone(),
            compat_version: request.compat_version.clone(),
        });
    }

    if !VERSION_NODE.is_match(&request.compat_version) {
        return Err(ShimError::InvalidVersion {
            compat_version: request.compat_version.clone(),
        });
    }

    let results: Vec<Result<ShimEntry, ShimError>> = symbols
        .par_iter()
        .map(|name| resolve_entry(model, plan, request, name))
        .collect();

    let mut entries = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(err) => failures.push(err),
        }
    }

    let spec = ShimSpec {
        target_library: request.target_library.clone(),
        compat_version: request.compat_version.clone(),
        live_soname: format!("{}.so", request.target_library),
        model_fingerprint: model.fingerprint(),
        entries,
    };

    Ok((spec, failures))
}

fn resolve_entry(
    model: &ApiModel,
    plan: &CompatPlan,
    request: &ShimRequest,
    name: &str,
) -> Result<ShimEntry, ShimError> {
    let library = &request.target_library;

    if !C_IDENTIFIER.is_match(name) {
        return Err(ShimError::InvalidName {
            name: name.to_string(),
        });
    }

    // A symbol only recorded at future versions still has a live definition
    let symbol = model
        .in_effect(library, name)
        .or_else(|| model.latest(library, name))
        .ok_or_else(|| ShimError::UnresolvedSymbol {
            library: library.clone(),
            symbol: name.to_string(),
        })?;

    if let Some(denied) = plan
        .findings_for(library, name)
        .find(|f| f.status == CompatStatus::Incompatible)
    {
        return Err(ShimError::Denied {
            library: library.clone(),
            symbol: name.to_string(),
            rule: denied.matched_rule.clone().unwrap_or_default(),
        });
    }

    let signature =
        SignatureClass::for_kind(symbol.kind).ok_or_else(|| ShimError::UnsupportedKind {
            library: library.clone(),
            symbol: name.to_string(),
            kind: symbol.kind,
        })?;

    Ok(ShimEntry::new(
        &request.compat_version,
        name,
        signature,
        symbol.version,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::footprint::VendorFootprint;
    use crate::core::policy::{Disposition, Policy};
    use crate::core::symbol::{ApiSymbol, SymbolKind};
    use crate::diff::classify;
    use crate::test_support::fixtures::{entry, function_model, rule, ShimScenario};

    fn scenario_plan() -> (ApiModel, CompatPlan) {
        let scenario = ShimScenario::new();
        let plan = classify(&scenario.model, &scenario.footprint, &scenario.policy).unwrap();
        (scenario.model, plan)
    }

    /// Generate a request whose version and symbol list are valid.
    fn outcome(model: &ApiModel, plan: &CompatPlan, request: &ShimRequest) -> ShimOutcome {
        generate(model, plan, request).unwrap()
    }

    #[test]
    fn test_shim_for_bridgeable_symbol() {
        let (model, plan) = scenario_plan();
        assert_eq!(plan.findings()[0].status, CompatStatus::RequiresShim);

        let request = ShimRequest::new("libbaz", "v2compat", ["baz"]);
        let outcome = outcome(&model, &plan, &request);
        assert!(outcome.is_complete());

        let source = outcome.source.unwrap();
        assert_eq!(source.file_name, "libbaz_v2compat_compat.cpp");
        assert!(source
            .contents
            .contains("__asm__(\".symver vndk_compat_fwd_v2compat__baz, baz@v2compat\");"));
        assert!(source.contents.contains(&model.fingerprint()));
    }

    #[test]
    fn test_absent_symbol_is_unresolved() {
        let (model, plan) = scenario_plan();
        let request = ShimRequest::new("libbaz", "v2compat", ["qux"]);

        let outcome = outcome(&model, &plan, &request);
        assert_eq!(outcome.source, None);
        assert_eq!(
            outcome.failures,
            vec![ShimError::UnresolvedSymbol {
                library: "libbaz".to_string(),
                symbol: "qux".to_string(),
            }]
        );
    }

    #[test]
    fn test_unresolved_symbol_does_not_block_resolvable_one() {
        let (model, plan) = scenario_plan();
        let request = ShimRequest::new("libbaz", "v2compat", ["baz", "qux"]);

        let outcome = outcome(&model, &plan, &request);
        assert!(!outcome.is_complete());
        assert_eq!(
            outcome.failures,
            vec![ShimError::UnresolvedSymbol {
                library: "libbaz".to_string(),
                symbol: "qux".to_string(),
            }]
        );

        let source = outcome.source.unwrap();
        assert_eq!(source.contents.matches(".symver").count(), 1);
        assert!(source.contents.contains("baz@v2compat"));
        assert!(!source.contents.contains("qux"));
    }

    #[test]
    fn test_generation_is_idempotent() {
        let (model, plan) = scenario_plan();
        let request = ShimRequest::new("libbaz", "v2compat", ["baz", "baz"]);

        let first = outcome(&model, &plan, &request);
        let second = outcome(&model, &plan, &request);
        assert_eq!(first, second);
        assert_eq!(first.source.unwrap().contents.matches(".symver").count(), 1);
    }

    #[test]
    fn test_failures_and_entries_keep_request_order() {
        let model = function_model(35, &[("libm", "a", 1), ("libm", "b", 1)]);
        let plan = CompatPlan::new(34, 35, Vec::new());
        let request = ShimRequest::new("libm", "v1", ["b", "missing1", "a", "missing2"]);

        let unresolved = |symbol: &str| ShimError::UnresolvedSymbol {
            library: "libm".to_string(),
            symbol: symbol.to_string(),
        };

        for _ in 0..16 {
            let outcome = outcome(&model, &plan, &request);
            assert_eq!(
                outcome.failures,
                vec![unresolved("missing1"), unresolved("missing2")]
            );

            let contents = outcome.source.unwrap().contents;
            let b = contents.find("b@v1").unwrap();
            let a = contents.find("a@v1").unwrap();
            assert!(b < a);
        }
    }

    #[test]
    fn test_denied_symbol_is_refused() {
        let model = function_model(35, &[("libbaz", "baz", 1)]);
        let footprint = VendorFootprint::new(3, vec![entry("libbaz", "baz", 2, "libv")]);
        let policy = Policy::new(
            None,
            vec![rule("no-baz", "libbaz:*", (1, 5), Disposition::Deny, 0)],
        )
        .unwrap();
        let plan = classify(&model, &footprint, &policy).unwrap();

        let outcome = outcome(&model, &plan, &ShimRequest::new("libbaz", "v2", ["baz"]));
        assert_eq!(outcome.source, None);
        assert!(matches!(
            outcome.failures.as_slice(),
            [ShimError::Denied { rule, .. }] if rule == "no-baz"
        ));
    }

    #[test]
    fn test_variables_are_rejected() {
        let model = ApiModel::new(
            35,
            vec![
                ApiSymbol::new("libc", "environ", 1, SymbolKind::Variable),
                ApiSymbol::new("libc", "getenv", 1, SymbolKind::Function),
            ],
        )
        .unwrap();
        let plan = CompatPlan::new(34, 35, Vec::new());

        let outcome = outcome(&model, &plan, &ShimRequest::new("libc", "v1", ["environ", "getenv"]));
        assert!(matches!(
            outcome.failures.as_slice(),
            [ShimError::UnsupportedKind { kind: SymbolKind::Variable, .. }]
        ));
        assert!(outcome.source.unwrap().contents.contains("getenv@v1"));
    }

    #[test]
    fn test_request_validation() {
        let (model, plan) = scenario_plan();

        let empty = ShimRequest::new("libbaz", "v2", Vec::<String>::new());
        assert!(matches!(
            generate(&model, &plan, &empty),
            Err(ShimError::EmptyRequest { .. })
        ));

        let bad_version = ShimRequest::new("libbaz", "2-compat", ["baz"]);
        assert!(matches!(
            generate(&model, &plan, &bad_version),
            Err(ShimError::InvalidVersion { .. })
        ));

        let bad_name = outcome(&model, &plan, &ShimRequest::new("libbaz", "v2", ["baz; rm"]));
        assert!(matches!(
            bad_name.failures.as_slice(),
            [ShimError::InvalidName { .. }]
        ));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let (model, plan) = scenario_plan();
        let requests = vec![
            ShimRequest::new("libbaz", "v2compat", ["qux"]),
            ShimRequest::new("libbaz", "v3compat", ["baz"]),
            ShimRequest::new("libbaz", "v3compat", ["baz"]),
        ];

        let results = generate_batch(&model, &plan, &requests);
        assert_eq!(results.len(), 3);

        let first = results[0].as_ref().unwrap();
        assert_eq!(first.source, None);
        assert!(matches!(
            first.failures.as_slice(),
            [ShimError::UnresolvedSymbol { .. }]
        ));
        assert_eq!(
            results[1].as_ref().unwrap().source.as_ref().unwrap().file_name,
            "libbaz_v3compat_compat.cpp"
        );
        assert!(matches!(results[2], Err(ShimError::DuplicateRequest { .. })));
    }
}
