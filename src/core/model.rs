//! The system partition's exported API surface.
//!
//! An `ApiModel` is an immutable snapshot scoped to one system API level.
//! A library may export several versions of a name; the version in effect
//! is the highest one not newer than the model's API level.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::errors::DataError;
use crate::core::symbol::{ApiLevel, ApiSymbol};
use crate::util::hash::Fingerprint;

/// Wire form of an [`ApiModel`], as written by the model provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiModelFile {
    pub api_level: ApiLevel,

    /// Libraries the provider scanned, if it declares them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<Vec<String>>,

    #[serde(default)]
    pub symbols: Vec<ApiSymbol>,
}

/// Immutable snapshot of the system API surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ApiModelFile", into = "ApiModelFile")]
pub struct ApiModel {
    api_level: ApiLevel,
    registry: Option<BTreeSet<String>>,
    /// library -> name -> versions, ascending
    libraries: BTreeMap<String, BTreeMap<String, Vec<ApiSymbol>>>,
}

impl ApiModel {
    /// Build a model without a library registry.
    pub fn new(
        api_level: ApiLevel,
        symbols: impl IntoIterator<Item = ApiSymbol>,
    ) -> Result<Self, DataError> {
        Self::build(api_level, None, symbols)
    }

    /// Build a model whose footprint references are checked against `registry`.
    pub fn with_registry<S: Into<String>>(
        api_level: ApiLevel,
        registry: impl IntoIterator<Item = S>,
        symbols: impl IntoIterator<Item = ApiSymbol>,
    ) -> Result<Self, DataError> {
        let registry = registry.into_iter().map(Into::into).collect();
        Self::build(api_level, Some(registry), symbols)
    }

    fn build(
        api_level: ApiLevel,
        registry: Option<BTreeSet<String>>,
        symbols: impl IntoIterator<Item = ApiSymbol>,
    ) -> Result<Self, DataError> {
        let mut libraries: BTreeMap<String, BTreeMap<String, Vec<ApiSymbol>>> = BTreeMap::new();

        for symbol in symbols {
            if let Some(registry) = &registry {
                if !registry.contains(&symbol.library) {
                    return Err(DataError::SymbolOutsideRegistry {
                        library: symbol.library,
                        name: symbol.name,
                    });
                }
            }

            let versions = libraries
                .entry(symbol.library.clone())
                .or_default()
                .entry(symbol.name.clone())
                .or_default();

            if versions.iter().any(|v| v.version == symbol.version) {
                return Err(DataError::DuplicateModelEntry {
                    library: symbol.library,
                    name: symbol.name,
                    version: symbol.version,
                });
            }
            versions.push(symbol);
        }

        for names in libraries.values_mut() {
            for versions in names.values_mut() {
                versions.sort_by_key(|s| s.version);
            }
        }

        Ok(ApiModel {
            api_level,
            registry,
            libraries,
        })
    }

    /// The system API level this snapshot was taken at.
    pub fn api_level(&self) -> ApiLevel {
        self.api_level
    }

    /// The declared library registry, if any.
    pub fn registry(&self) -> Option<&BTreeSet<String>> {
        self.registry.as_ref()
    }

    /// Whether `library` may legitimately be referenced by a footprint.
    ///
    /// Without a registry every library counts as registered.
    pub fn is_registered(&self, library: &str) -> bool {
        self.registry
            .as_ref()
            .map_or(true, |registry| registry.contains(library))
    }

    /// All versions of `library:name`, ascending. Empty when absent.
    pub fn versions(&self, library: &str, name: &str) -> &[ApiSymbol] {
        self.libraries
            .get(library)
            .and_then(|names| names.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `library:name` exists under any version.
    pub fn contains(&self, library: &str, name: &str) -> bool {
        !self.versions(library, name).is_empty()
    }

    /// The highest version of `library:name` not newer than the model's API level.
    pub fn in_effect(&self, library: &str, name: &str) -> Option<&ApiSymbol> {
        self.versions(library, name)
            .iter()
            .rev()
            .find(|s| s.version <= self.api_level)
    }

    /// The newest recorded version of `library:name`, regardless of API level.
    pub fn latest(&self, library: &str, name: &str) -> Option<&ApiSymbol> {
        self.versions(library, name).last()
    }

    /// Every symbol in canonical `(library, name, version)` order.
    pub fn symbols(&self) -> impl Iterator<Item = &ApiSymbol> {
        self.libraries
            .values()
            .flat_map(|names| names.values())
            .flatten()
    }

    /// Number of `(library, name, version)` entries.
    pub fn len(&self) -> usize {
        self.symbols().count()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }

    /// Content fingerprint, stable across runs.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_u32(self.api_level);

        match &self.registry {
            Some(registry) => {
                fp.update_opt(Some("registry"));
                for library in registry {
                    fp.update_str(library);
                }
            }
            None => {
                fp.update_opt(None);
            }
        }

        for symbol in self.symbols() {
            fp.update_str(&symbol.library)
                .update_str(&symbol.name)
                .update_u32(symbol.version)
                .update_str(symbol.kind.as_str());
        }

        fp.finish()
    }
}

impl TryFrom<ApiModelFile> for ApiModel {
    type Error = DataError;

    fn try_from(file: ApiModelFile) -> Result<Self, Self::Error> {
        Self::build(
            file.api_level,
            file.registry.map(|r| r.into_iter().collect()),
            file.symbols,
        )
    }
}

impl From<ApiModel> for ApiModelFile {
    fn from(model: ApiModel) -> Self {
        let symbols = model.symbols().cloned().collect();
        ApiModelFile {
            api_level: model.api_level,
            registry: model.registry.map(|r| r.into_iter().collect()),
            symbols,
        }
    }
}
