//! Compatibility policy: ordered rules scoped to a vendor API level.
//!
//! Rule selection is a pure total order over the matching rules:
//! an exact pattern beats a wildcard, then higher priority wins, then the
//! rule declared first wins. No load-order state survives construction.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::errors::ConfigError;
use crate::core::symbol::ApiLevel;

/// What a rule decides for the symbols it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Allow,
    Deny,
    RequireShim,
    DeprecatedOk,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Allow => "allow",
            Disposition::Deny => "deny",
            Disposition::RequireShim => "require_shim",
            Disposition::DeprecatedOk => "deprecated_ok",
        }
    }

    /// Whether the rule explicitly tolerates a broken or absent symbol.
    pub fn permits_break(&self) -> bool {
        matches!(self, Disposition::Allow | Disposition::DeprecatedOk)
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range of vendor API levels a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[ApiLevel; 2]", into = "[ApiLevel; 2]")]
pub struct ApiLevelRange {
    pub low: ApiLevel,
    pub high: ApiLevel,
}

impl ApiLevelRange {
    pub fn new(low: ApiLevel, high: ApiLevel) -> Self {
        ApiLevelRange { low, high }
    }

    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }

    pub fn contains(&self, level: ApiLevel) -> bool {
        self.low <= level && level <= self.high
    }
}

impl From<[ApiLevel; 2]> for ApiLevelRange {
    fn from([low, high]: [ApiLevel; 2]) -> Self {
        ApiLevelRange { low, high }
    }
}

impl From<ApiLevelRange> for [ApiLevel; 2] {
    fn from(range: ApiLevelRange) -> Self {
        [range.low, range.high]
    }
}

/// A policy rule as declared in the policy file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,

    /// `library:name` or `name`, each part a literal or a glob
    pub pattern: String,

    pub api_level_range: ApiLevelRange,

    pub disposition: Disposition,

    #[serde(default)]
    pub priority: i32,
}

impl PolicyRule {
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        api_level_range: ApiLevelRange,
        disposition: Disposition,
        priority: i32,
    ) -> Self {
        PolicyRule {
            id: id.into(),
            pattern: pattern.into(),
            api_level_range,
            disposition,
            priority,
        }
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Glob(glob::Pattern),
}

impl Segment {
    fn parse(text: &str) -> Result<Self, glob::PatternError> {
        if text.contains(['*', '?', '[']) {
            Ok(Segment::Glob(glob::Pattern::new(text)?))
        } else {
            Ok(Segment::Literal(text.to_string()))
        }
    }

    fn is_literal(&self) -> bool {
        matches!(self, Segment::Literal(_))
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == text,
            Segment::Glob(pattern) => pattern.matches(text),
        }
    }
}

/// A compiled rule pattern.
#[derive(Debug, Clone)]
pub struct RulePattern {
    library: Option<Segment>,
    name: Segment,
}

impl RulePattern {
    /// Parse `library:name` or a bare `name`.
    ///
    /// A `::` scope operator never separates the library, so `std::foo` is a
    /// bare name and `libc++:std::foo*` names `std::foo*` in `libc++`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (library, name) = match separator(raw) {
            Some(at) => (Some(&raw[..at]), &raw[at + 1..]),
            None => (None, raw),
        };

        if name.is_empty() {
            return Err("symbol name part is empty".to_string());
        }
        if library.is_some_and(str::is_empty) {
            return Err("library part is empty".to_string());
        }

        let library = library
            .map(Segment::parse)
            .transpose()
            .map_err(|e| e.to_string())?;
        let name = Segment::parse(name).map_err(|e| e.to_string())?;

        Ok(RulePattern { library, name })
    }

    /// Exact patterns name one symbol literally; a bare name counts as exact.
    pub fn is_exact(&self) -> bool {
        self.name.is_literal() && self.library.as_ref().map_or(true, Segment::is_literal)
    }

    pub fn matches(&self, library: &str, name: &str) -> bool {
        self.name.matches(name) && self.library.as_ref().map_or(true, |l| l.matches(library))
    }
}

/// Offset of the last `:` that is not part of a `::`.
fn separator(raw: &str) -> Option<usize> {
    let bytes = raw.as_bytes();
    (0..bytes.len()).rev().find(|&i| {
        bytes[i] == b':'
            && (i == 0 || bytes[i - 1] != b':')
            && bytes.get(i + 1) != Some(&b':')
    })
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: PolicyRule,
    pattern: RulePattern,
    position: usize,
}

impl CompiledRule {
    /// Precedence: exact over wildcard, then priority, then earlier declaration.
    fn precedence(&self, other: &CompiledRule) -> Ordering {
        self.pattern
            .is_exact()
            .cmp(&other.pattern.is_exact())
            .then(self.rule.priority.cmp(&other.rule.priority))
            .then(other.position.cmp(&self.position))
    }
}

/// Wire form of a [`Policy`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyFile {
    /// Vendor API level the policy was written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_level: Option<ApiLevel>,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// A validated, ordered policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PolicyFile", into = "PolicyFile")]
pub struct Policy {
    api_level: Option<ApiLevel>,
    rules: Vec<CompiledRule>,
}

impl Policy {
    /// Validate and compile a rule list.
    ///
    /// Fails on duplicate ids, inverted ranges and unparsable patterns.
    pub fn new(api_level: Option<ApiLevel>, rules: Vec<PolicyRule>) -> Result<Self, ConfigError> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (position, rule) in rules.iter().enumerate() {
            if let Some(&first) = seen.get(rule.id.as_str()) {
                return Err(ConfigError::DuplicateRuleId {
                    id: rule.id.clone(),
                    first,
                    second: position,
                });
            }
            seen.insert(&rule.id, position);

            if !rule.api_level_range.is_valid() {
                return Err(ConfigError::InvalidRange {
                    id: rule.id.clone(),
                    low: rule.api_level_range.low,
                    high: rule.api_level_range.high,
                });
            }
        }

        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(position, rule)| {
                let pattern =
                    RulePattern::parse(&rule.pattern).map_err(|message| ConfigError::InvalidPattern {
                        id: rule.id.clone(),
                        pattern: rule.pattern.clone(),
                        message,
                    })?;
                Ok(CompiledRule {
                    rule,
                    pattern,
                    position,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Policy { api_level, rules })
    }

    /// A policy with no rules.
    pub fn empty() -> Self {
        Policy {
            api_level: None,
            rules: Vec::new(),
        }
    }

    pub fn api_level(&self) -> Option<ApiLevel> {
        self.api_level
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> impl Iterator<Item = &PolicyRule> {
        self.rules.iter().map(|c| &c.rule)
    }

    pub fn get(&self, id: &str) -> Option<&PolicyRule> {
        self.rules().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Reject a policy written for a different vendor level than the footprint's.
    pub fn check_vendor_level(&self, vendor_level: ApiLevel) -> Result<(), ConfigError> {
        match self.api_level {
            Some(policy) if policy != vendor_level => Err(ConfigError::LevelMismatch {
                policy,
                footprint: vendor_level,
            }),
            _ => Ok(()),
        }
    }

    /// Select the governing rule for `library:name` at `vendor_level`.
    pub fn select(
        &self,
        library: &str,
        name: &str,
        vendor_level: ApiLevel,
    ) -> Result<Option<&PolicyRule>, ConfigError> {
        self.select_where(library, name, vendor_level, |_| true)
    }

    /// Select the highest-precedence `allow` or `deprecated_ok` rule for
    /// `library:name`, ignoring any rule that does not tolerate a break.
    pub fn select_permitting(
        &self,
        library: &str,
        name: &str,
        vendor_level: ApiLevel,
    ) -> Result<Option<&PolicyRule>, ConfigError> {
        self.select_where(library, name, vendor_level, |rule| {
            rule.disposition.permits_break()
        })
    }

    fn select_where(
        &self,
        library: &str,
        name: &str,
        vendor_level: ApiLevel,
        eligible: impl Fn(&PolicyRule) -> bool,
    ) -> Result<Option<&PolicyRule>, ConfigError> {
        let mut best: Option<&CompiledRule> = None;
        let mut tied: Option<&CompiledRule> = None;

        let candidates = self.rules.iter().filter(|c| {
            eligible(&c.rule)
                && c.rule.api_level_range.contains(vendor_level)
                && c.pattern.matches(library, name)
        });

        for candidate in candidates {
            match best {
                None => best = Some(candidate),
                Some(current) => match candidate.precedence(current) {
                    Ordering::Greater => {
                        best = Some(candidate);
                        tied = None;
                    }
                    Ordering::Equal => tied = Some(candidate),
                    Ordering::Less => {}
                },
            }
        }

        if let (Some(best), Some(tied)) = (best, tied) {
            return Err(ConfigError::UnresolvedTie {
                symbol: format!("{}:{}", library, name),
                first: best.rule.id.clone(),
                second: tied.rule.id.clone(),
            });
        }

        Ok(best.map(|c| &c.rule))
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::empty()
    }
}

impl TryFrom<PolicyFile> for Policy {
    type Error = ConfigError;

    fn try_from(file: PolicyFile) -> Result<Self, Self::Error> {
        Policy::new(file.api_level, file.rules)
    }
}

impl From<Policy> for PolicyFile {
    fn from(policy: Policy) -> Self {
        PolicyFile {
            api_level: policy.api_level,
            rules: policy.rules.into_iter().map(|c| c.rule).collect(),
        }
    }
}
