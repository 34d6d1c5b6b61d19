//! Environment setup before reconciliation.
//!
//! Catalogs may list setup commands (trusting a package repository,
//! refreshing an index) that must succeed before any package is touched.
//! The first failing command aborts the run.

use std::path::Path;

use crate::catalog::SetupStep;
use crate::error::{ProvisionError, Result};
use crate::shell::{execute, exit_status, CommandOptions};
use crate::ui::{format_duration, UserInterface};

/// Run setup steps in order, stopping at the first failure.
///
/// # Errors
///
/// Returns `SetupFailed` naming the step when a command cannot be started
/// or exits non-zero.
pub fn run_setup(steps: &[SetupStep], project_root: &Path, ui: &mut dyn UserInterface) -> Result<()> {
    if steps.is_empty() {
        return Ok(());
    }

    tracing::info!("Running {} setup step(s)", steps.len());
    let options = CommandOptions {
        cwd: Some(project_root.to_path_buf()),
        capture_stdout: true,
        capture_stderr: true,
        ..Default::default()
    };

    for step in steps {
        let mut spinner = ui.start_spinner(&format!("Setup: {}", step.name));

        let output = execute(&step.command, &options).map_err(|e| {
            spinner.finish_error(&format!("Setup: {}", step.name));
            ProvisionError::SetupFailed {
                step: step.name.clone(),
                message: e.to_string(),
            }
        })?;

        if ui.output_mode().shows_command_output() {
            for line in output.stdout.lines().chain(output.stderr.lines()) {
                ui.message(&format!("    {}", line));
            }
        }

        if !output.success {
            spinner.finish_error(&format!("Setup: {}", step.name));
            let detail = output.last_error_line().unwrap_or("no output");
            return Err(ProvisionError::SetupFailed {
                step: step.name.clone(),
                message: format!("{}: {}", exit_status(output.exit_code), detail),
            });
        }

        tracing::debug!("Setup step '{}' finished in {:?}", step.name, output.duration);
        spinner.finish_success(&format!(
            "Setup: {} ({})",
            step.name,
            format_duration(output.duration)
        ));
    }

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::ui::{MockUI, OutputMode, SpinnerStatus};
    use tempfile::TempDir;

    fn step(name: &str, command: &str) -> SetupStep {
        SetupStep {
            name: name.to_string(),
            command: command.to_string(),
        }
    }

    #[test]
    fn runs_steps_in_order() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let steps = [
            step("first", "echo one > order.txt"),
            step("second", "echo two >> order.txt"),
        ];

        run_setup(&steps, temp.path(), &mut ui).unwrap();

        let content = std::fs::read_to_string(temp.path().join("order.txt")).unwrap();
        assert_eq!(content, "one\ntwo\n");
        assert_eq!(ui.spinner_finishes().len(), 2);
    }

    #[test]
    fn first_failure_aborts() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        let steps = [
            step("trust", "echo 'repository unreachable' >&2; exit 4"),
            step("never", "touch ran.txt"),
        ];

        let err = run_setup(&steps, temp.path(), &mut ui).unwrap_err();

        match err {
            ProvisionError::SetupFailed { step, message } => {
                assert_eq!(step, "trust");
                assert!(message.contains("exit code 4"));
                assert!(message.contains("repository unreachable"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp.path().join("ran.txt").exists());
        assert_eq!(ui.spinner_finishes()[0].0, SpinnerStatus::Error);
    }

    #[test]
    fn verbose_mode_echoes_output() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        run_setup(&[step("hello", "echo hi there")], temp.path(), &mut ui).unwrap();
        assert!(ui.has_message("hi there"));
    }

    #[test]
    fn no_steps_is_ok() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();
        run_setup(&[], temp.path(), &mut ui).unwrap();
        assert!(ui.spinners().is_empty());
    }
}
