//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// vndk-compat - Vendor interface compatibility engine
#[derive(Parser)]
#[command(name = "vndk-compat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file (overrides the project config)
    #[arg(long, global = true, env = "VNDK_COMPAT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify a vendor footprint against a system model
    Classify(ClassifyArgs),

    /// Score a saved compatibility plan
    Score(ScoreArgs),

    /// Generate forwarding shims for bridgeable symbols
    Shim(ShimArgs),

    /// Emit the linker namespace configuration for a plan
    LinkerConfig(LinkerConfigArgs),
}

#[derive(Args)]
pub struct ClassifyArgs {
    /// System API model (JSON)
    #[arg(long)]
    pub model: PathBuf,

    /// Vendor footprint (JSON)
    #[arg(long)]
    pub footprint: PathBuf,

    /// Policy file (JSON or TOML)
    #[arg(long, conflicts_with = "policy_dir")]
    pub policy: Option<PathBuf>,

    /// Directory holding v{N}.policy.{json,toml} files
    #[arg(long)]
    pub policy_dir: Option<PathBuf>,

    /// Write the plan here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of classification workers
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Saved plan (JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// Pass threshold, 0-100
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub threshold: Option<u32>,

    /// Output format (props, json)
    #[arg(long, default_value = "props")]
    pub format: String,

    /// Write the score here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit with an error when the score is below the threshold
    #[arg(long)]
    pub enforce: bool,
}

#[derive(Args)]
pub struct ShimArgs {
    /// System API model (JSON)
    #[arg(long)]
    pub model: PathBuf,

    /// Saved plan (JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// JSON file holding one request or an array of requests
    #[arg(long, conflicts_with_all = ["library", "compat_version"])]
    pub requests: Option<PathBuf>,

    /// Target library of a single request
    #[arg(long, requires = "compat_version")]
    pub library: Option<String>,

    /// Compat version node of a single request
    #[arg(long = "compat-version", requires = "library")]
    pub compat_version: Option<String>,

    /// Emit symbols in canonical order instead of argument order
    #[arg(long)]
    pub sorted: bool,

    /// Symbols of a single request
    pub symbols: Vec<String>,

    /// Directory the sources are written to
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct LinkerConfigArgs {
    /// Saved plan (JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// Existing linker configuration to extend (JSON)
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Write the configuration here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit the compat namespace even if nothing requires a shim
    #[arg(long)]
    pub force: bool,
}
