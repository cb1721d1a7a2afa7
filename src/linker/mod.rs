//! Linker namespace configuration for bridged vendor libraries.
//!
//! When a plan needs shims, the vendor side gets an isolated namespace
//! `vndk_compat_v{N}` that can see the compat libraries for level `N` and
//! is linked both ways with `default`.

use serde::{Deserialize, Serialize};

use crate::core::plan::{CompatPlan, CompatStatus};
use crate::core::symbol::ApiLevel;

/// Name of the namespace every config is linked against.
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerConfig {
    #[serde(default)]
    pub namespaces: Vec<Namespace>,
}

/// A linker namespace. Namespaces are isolated and visible unless declared otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,

    #[serde(default = "default_true")]
    pub isolated: bool,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default)]
    pub search_paths: Vec<String>,

    #[serde(default)]
    pub permitted_paths: Vec<String>,

    #[serde(default)]
    pub links: Vec<NamespaceLink>,
}

fn default_true() -> bool {
    true
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            isolated: true,
            visible: true,
            search_paths: Vec::new(),
            permitted_paths: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Add a link to `target` exposing all of its shared libraries, unless
    /// a link to `target` already exists.
    pub fn link_to(&mut self, target: &str) {
        if !self.links.iter().any(|l| l.target == target) {
            self.links.push(NamespaceLink {
                target: target.to_string(),
                allow_all_shared_libs: true,
                shared_libs: Vec::new(),
            });
        }
    }

    fn normalize(&mut self) {
        self.search_paths.sort();
        self.search_paths.dedup();
        self.permitted_paths.sort();
        self.permitted_paths.dedup();
        for link in &mut self.links {
            link.shared_libs.sort();
            link.shared_libs.dedup();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceLink {
    pub target: String,

    #[serde(default)]
    pub allow_all_shared_libs: bool,

    #[serde(default)]
    pub shared_libs: Vec<String>,
}

impl LinkerConfig {
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    fn namespace_mut(&mut self, name: &str) -> &mut Namespace {
        let index = match self.namespaces.iter().position(|ns| ns.name == name) {
            Some(index) => index,
            None => {
                self.namespaces.push(Namespace::new(name));
                self.namespaces.len() - 1
            }
        };
        &mut self.namespaces[index]
    }
}

/// `vndk_compat_v{level}`
pub fn compat_namespace_name(vendor_level: ApiLevel) -> String {
    format!("vndk_compat_v{}", vendor_level)
}

/// Directories holding the compat libraries for `vendor_level`.
pub fn compat_paths(vendor_level: ApiLevel) -> [String; 2] {
    [
        format!("/system/lib64/vndk-v{}", vendor_level),
        format!("/system/lib/vndk-v{}", vendor_level),
    ]
}

/// Whether any finding needs a shim at runtime.
pub fn needs_compat_namespace(plan: &CompatPlan) -> bool {
    plan.with_status(CompatStatus::RequiresShim).next().is_some()
}

/// Extend `base` with the compat namespace for `plan`'s vendor level.
///
/// Returns `None` when the plan has no `RequiresShim` finding and `force`
/// is not set.
pub fn linker_config(
    plan: &CompatPlan,
    base: Option<LinkerConfig>,
    force: bool,
) -> Option<LinkerConfig> {
    if !force && !needs_compat_namespace(plan) {
        tracing::debug!("No finding requires a shim, skipping linker namespace");
        return None;
    }

    let mut config = base.unwrap_or_default();
    let name = compat_namespace_name(plan.vendor_api_level());

    {
        let compat = config.namespace_mut(&name);
        compat.isolated = true;
        compat.visible = true;
        compat
            .permitted_paths
            .extend(compat_paths(plan.vendor_api_level()));
        compat.link_to(DEFAULT_NAMESPACE);
    }
    config.namespace_mut(DEFAULT_NAMESPACE).link_to(&name);

    for namespace in &mut config.namespaces {
        namespace.normalize();
    }

    tracing::info!("Linker namespace `{}` configured", name);

    Some(config)
}
