//! Implementation of `vndk-compat score`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::ops::load::load_plan;
use crate::score::{score, CompatScore, DEFAULT_THRESHOLD};
use crate::util::fs::write_string;

/// Output format for scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreFormat {
    /// `ro.vndk.compat_*` build properties (default)
    #[default]
    Properties,
    /// Machine-readable JSON
    Json,
}

impl std::str::FromStr for ScoreFormat {
    type Err = ScoreFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "props" | "prop" | "properties" => Ok(ScoreFormat::Properties),
            "json" => Ok(ScoreFormat::Json),
            _ => Err(ScoreFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing a score format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreFormatParseError(pub String);

impl std::fmt::Display for ScoreFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid score format '{}', valid values: props, json", self.0)
    }
}

impl std::error::Error for ScoreFormatParseError {}

/// Options for the score command.
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// Saved plan
    pub plan: PathBuf,

    /// Pass threshold, 0-100
    pub threshold: u32,

    /// Output format
    pub format: ScoreFormat,

    /// Where to write the rendered score (None = don't write)
    pub output: Option<PathBuf>,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        ScoreOptions {
            plan: PathBuf::new(),
            threshold: DEFAULT_THRESHOLD,
            format: ScoreFormat::default(),
            output: None,
        }
    }
}

/// Score a saved plan. Returns the score and its rendering.
pub fn score_plan(opts: &ScoreOptions) -> Result<(CompatScore, String)> {
    let plan = load_plan(&opts.plan)?;
    let compat_score = score(&plan, opts.threshold);
    let rendered = render_score(&compat_score, opts.format)?;

    if let Some(output) = &opts.output {
        write_string(output, &rendered)?;
        tracing::info!("Wrote score to {}", output.display());
    }

    Ok((compat_score, rendered))
}

/// Render a score in the requested format.
pub fn render_score(compat_score: &CompatScore, format: ScoreFormat) -> Result<String> {
    match format {
        ScoreFormat::Properties => Ok(compat_score.to_properties()),
        ScoreFormat::Json => {
            let mut json = serde_json::to_string_pretty(compat_score)
                .context("failed to serialize score")?;
            json.push('\n');
            Ok(json)
        }
    }
}
