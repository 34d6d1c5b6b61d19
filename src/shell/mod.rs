//! Shell command execution for backend commands and setup steps.

pub mod command;
pub mod platform;
pub mod template;

pub use command::{execute, execute_quiet, exit_status, CommandOptions, CommandOutput};
pub use platform::{is_ci, shell_invocation};
pub use template::{quote, render};
