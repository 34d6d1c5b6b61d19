//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`].

pub mod completions;
pub mod dispatcher;
pub mod plan;
pub mod run;
pub mod schema;

pub use dispatcher::{Command, CommandContext, CommandDispatcher, CommandResult};
