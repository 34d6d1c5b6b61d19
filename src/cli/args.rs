//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct. Run flags are accepted
//! without a subcommand, so `provisioner --uninstall-existing` and
//! `provisioner run --uninstall-existing` are the same.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::ui::OutputMode;

/// Provisioner - converge installed packages to a catalog of minimum versions.
#[derive(Debug, Parser)]
#[command(name = "provisioner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to catalog file (overrides default .provisioner/catalog.yml)
    #[arg(short, long, global = true, env = "PROVISIONER_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output mode requested by flags, if any.
    pub fn output_mode(&self) -> Option<OutputMode> {
        if self.quiet {
            Some(OutputMode::Quiet)
        } else if self.verbose {
            Some(OutputMode::Verbose)
        } else {
            None
        }
    }

    /// Whether the command writes JSON to stdout.
    pub fn wants_json(&self) -> bool {
        match &self.command {
            Some(Commands::Run(args)) => args.json,
            Some(Commands::Plan(args)) => args.json,
            Some(Commands::Schema) | Some(Commands::Completions(_)) => true,
            None => self.run.json,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Reconcile installed packages with the catalog (default)
    Run(RunArgs),

    /// Show what a run would do without changing anything
    Plan(PlanArgs),

    /// Print the JSON Schema of the catalog file
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RunArgs {
    /// Uninstall packages that are already present, then install them again
    #[arg(long)]
    pub uninstall_existing: bool,

    /// Skip the catalog's setup commands
    #[arg(long)]
    pub skip_prereq_setup: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `plan` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct PlanArgs {
    /// Plan as if packages that are present would be reinstalled
    #[arg(long)]
    pub uninstall_existing: bool,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
