//! Loading and saving engine inputs and outputs.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::{ApiLevel, ApiModel, ApiModelFile, CompatPlan, Policy, PolicyFile, VendorFootprint};
use crate::util::fs::{read_json, read_structured, write_json};

/// Load a system API model.
pub fn load_model(path: &Path) -> Result<ApiModel> {
    let file: ApiModelFile = read_json(path)?;
    let model = ApiModel::try_from(file)
        .with_context(|| format!("invalid system model: {}", path.display()))?;

    tracing::debug!(
        "Loaded model at api level {} with {} symbols",
        model.api_level(),
        model.len()
    );
    Ok(model)
}

/// Load a vendor footprint.
pub fn load_footprint(path: &Path) -> Result<VendorFootprint> {
    let footprint: VendorFootprint = read_json(path)?;
    tracing::debug!(
        "Loaded footprint at api level {} with {} entries",
        footprint.api_level,
        footprint.len()
    );
    Ok(footprint)
}

/// Load a policy from a JSON or TOML file.
pub fn load_policy(path: &Path) -> Result<Policy> {
    let file: PolicyFile = read_structured(path)?;
    let policy = Policy::try_from(file)
        .with_context(|| format!("invalid policy: {}", path.display()))?;

    tracing::debug!("Loaded {} policy rules from {}", policy.len(), path.display());
    Ok(policy)
}

/// Find `v{level}.policy.json` or `v{level}.policy.toml` in `dir`.
pub fn find_policy_file(dir: &Path, vendor_level: ApiLevel) -> Option<PathBuf> {
    ["json", "toml"]
        .iter()
        .map(|ext| dir.join(format!("v{}.policy.{}", vendor_level, ext)))
        .find(|path| path.is_file())
}

/// Load the policy for `vendor_level` from a policy directory.
///
/// A missing policy file yields an empty policy.
pub fn load_policy_for_level(dir: &Path, vendor_level: ApiLevel) -> Result<Policy> {
    match find_policy_file(dir, vendor_level) {
        Some(path) => load_policy(&path),
        None => {
            tracing::warn!(
                "No policy for vendor api level {} in {}, classifying without rules",
                vendor_level,
                dir.display()
            );
            Ok(Policy::empty())
        }
    }
}

/// Load a previously saved plan.
pub fn load_plan(path: &Path) -> Result<CompatPlan> {
    let plan: CompatPlan = read_json(path)?;

    if !plan.is_compatible() {
        bail!(
            "plan format version {} is not supported by this version of vndk-compat",
            plan.format_version()
        );
    }

    Ok(plan)
}

/// Save a plan as pretty-printed JSON.
pub fn save_plan(path: &Path, plan: &CompatPlan) -> Result<()> {
    write_json(path, plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigError;
    use crate::test_support::fixtures::ShimScenario;
    use tempfile::TempDir;

    #[test]
    fn test_load_scenario_files() {
        let tmp = TempDir::new().unwrap();
        let scenario = ShimScenario::new();
        let paths = scenario.write_to(tmp.path());

        assert_eq!(load_model(&paths.model).unwrap(), scenario.model);
        assert_eq!(load_footprint(&paths.footprint).unwrap(), scenario.footprint);
        assert_eq!(load_policy(&paths.policy).unwrap().len(), 1);
    }

    #[test]
    fn test_policy_lookup_by_level() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("v34.policy.toml"),
            r#"
api_level = 34

[[rules]]
id = "legacy"
pattern = "libc:*"
api_level_range = [30, 34]
disposition = "deprecated_ok"
"#,
        )
        .unwrap();

        let policy = load_policy_for_level(tmp.path(), 34).unwrap();
        assert_eq!(policy.api_level(), Some(34));
        assert!(policy.get("legacy").is_some());

        assert!(load_policy_for_level(tmp.path(), 33).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_rule_is_typed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("v3.policy.json");
        std::fs::write(
            &path,
            r#"{"rules": [
                {"id": "r1", "pattern": "a", "api_level_range": [1, 2], "disposition": "allow"},
                {"id": "r1", "pattern": "b", "api_level_range": [1, 2], "disposition": "deny"}
            ]}"#,
        )
        .unwrap();

        let err = load_policy(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::DuplicateRuleId { .. })
        ));
    }

    #[test]
    fn test_plan_round_trip_and_version_check() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plan.json");

        let plan = CompatPlan::new(3, 35, Vec::new());
        save_plan(&path, &plan).unwrap();
        assert_eq!(load_plan(&path).unwrap(), plan);

        std::fs::write(
            &path,
            r#"{"format_version": 2, "vendor_api_level": 3, "system_api_level": 35, "findings": []}"#,
        )
        .unwrap();
        let err = load_plan(&path).unwrap_err();
        assert!(err.to_string().contains("format version 2"));
    }
}
