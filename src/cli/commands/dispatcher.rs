//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::completions::CompletionsCommand;
use super::plan::PlanCommand;
use super::run::RunCommand;
use super::schema::SchemaCommand;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// `Err` is reserved for fatal errors; the caller maps it to exit code 1.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Shared options every catalog-reading command needs.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Project root the catalog is discovered from.
    pub project_root: PathBuf,
    /// Explicit catalog file, replacing discovery.
    pub catalog: Option<PathBuf>,
    /// Whether the output mode came from a flag rather than the catalog.
    pub output_mode_from_flags: bool,
}

impl CommandContext {
    /// Context for a project root with defaults.
    pub fn new(project_root: &Path) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            catalog: None,
            output_mode_from_flags: false,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_root: PathBuf,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf) -> Self {
        Self { project_root }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let context = CommandContext {
            project_root: self.project_root.clone(),
            catalog: cli.catalog.clone(),
            output_mode_from_flags: cli.output_mode().is_some(),
        };

        match &cli.command {
            Some(Commands::Run(args)) => RunCommand::new(context, args.clone()).execute(ui),
            Some(Commands::Plan(args)) => PlanCommand::new(context, args.clone()).execute(ui),
            Some(Commands::Schema) => SchemaCommand::new().execute(ui),
            Some(Commands::Completions(args)) => {
                CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => RunCommand::new(context, cli.run.clone()).execute(ui),
        }
    }
}
