//! vndk-compat CLI - Vendor interface compatibility engine

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use vndk_compat::core::{ConfigError, DataError};
use vndk_compat::diff::DiffError;
use vndk_compat::shim::ShimError;
use vndk_compat::util::diagnostic::{emit, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match engine_diagnostic(&e) {
            Some(diagnostic) => emit(&diagnostic, color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("vndk_compat=debug")
    } else {
        EnvFilter::new("vndk_compat=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config = commands::load_effective_config(cli.config.as_deref())?;

    // Execute command
    match cli.command {
        Commands::Classify(args) => commands::classify::execute(args, &config),
        Commands::Score(args) => commands::score::execute(args, &config),
        Commands::Shim(args) => commands::shim::execute(args, &config, color),
        Commands::LinkerConfig(args) => commands::linker_config::execute(args),
    }
}

/// Render engine errors with their rule or symbol key and suggested fixes.
fn engine_diagnostic(err: &anyhow::Error) -> Option<Diagnostic> {
    let diagnostic = err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<DiffError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<ConfigError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<DataError>() {
            Some(e.to_diagnostic())
        } else {
            cause.downcast_ref::<ShimError>().map(ShimError::to_diagnostic)
        }
    })?;

    // Keep the outer context (usually the offending file)
    let outer = err.to_string();
    if outer != diagnostic.message {
        Some(diagnostic.with_context(outer))
    } else {
        Some(diagnostic)
    }
}
