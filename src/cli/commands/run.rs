//! Run command implementation.
//!
//! The `provisioner run` command loads the catalog, runs setup, builds the
//! provider and reconciles every package. Failed packages do not change
//! the exit code; only fatal errors do.

use crate::catalog::Catalog;
use crate::cli::args::RunArgs;
use crate::error::{ProvisionError, Result};
use crate::prereq::run_setup;
use crate::provider::build_provider;
use crate::reconciler::{ReconcileProgress, Reconciler};
use crate::report::{json, text};
use crate::ui::{ProvisionTheme, SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    context: CommandContext,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(context: CommandContext, args: RunArgs) -> Self {
        Self { context, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }
}

/// Load the catalog, reporting a missing one on the UI.
///
/// Returns `Ok(None)` when no catalog exists, which callers turn into exit
/// code 2.
pub(super) fn load_catalog(
    context: &CommandContext,
    ui: &mut dyn UserInterface,
) -> Result<Option<Catalog>> {
    match Catalog::load(&context.project_root, context.catalog.as_deref()) {
        Ok(catalog) => {
            // Silent UIs (JSON output) stay silent.
            if !context.output_mode_from_flags && ui.output_mode().shows_status() {
                ui.set_output_mode(catalog.config.settings.default_output.into());
            }
            Ok(Some(catalog))
        }
        Err(ProvisionError::CatalogNotFound { path }) => {
            ui.error(&format!("No catalog found at {}", path.display()));
            ui.message("Create .provisioner/catalog.yml or pass --catalog <PATH>.");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(catalog) = load_catalog(&self.context, ui)? else {
            return Ok(CommandResult::failure(2));
        };
        let root = &self.context.project_root;

        ui.show_header(catalog.app_name());

        if self.args.skip_prereq_setup {
            tracing::info!("Skipping setup commands");
        } else {
            run_setup(&catalog.config.setup, root, ui)?;
        }

        let provider = build_provider(&catalog.config, root)?;
        let reconciler =
            Reconciler::new(&*provider).force_reinstall(self.args.uninstall_existing);

        let show_progress = ui.output_mode().shows_progress();
        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;
        let report = reconciler.reconcile_with_progress(&catalog.entries, |progress| {
            match progress {
                ReconcileProgress::EntryStarting { entry, index, total } if show_progress => {
                    spinner = Some(ui.start_spinner(&format!(
                        "[{}/{}] {} (>= {})",
                        index + 1,
                        total,
                        entry.name,
                        entry.min_version
                    )));
                }
                ReconcileProgress::EntryFinished { record, .. } => {
                    if let Some(mut s) = spinner.take() {
                        s.finish_outcome(record.kind, &text::record_line(record));
                    }
                }
                _ => {}
            }
        });

        if self.args.json {
            println!("{}", json::render(&report)?);
        } else {
            if show_progress {
                ui.message("");
            }
            let theme = if ui.is_interactive() {
                ProvisionTheme::detect()
            } else {
                ProvisionTheme::plain()
            };
            for line in text::render(&report, &theme) {
                ui.message(&line);
            }
        }

        let failed = report.counts().failed;
        if failed > 0 {
            ui.warning(&format!("{} package(s) could not be reconciled", failed));
        }

        Ok(CommandResult::success())
    }
}
