//! Plan command implementation.
//!
//! The `provisioner plan` command queries every package and shows the
//! action a run would take. Setup commands are not run and nothing is
//! installed or removed.

use crate::cli::args::PlanArgs;
use crate::error::Result;
use crate::provider::build_provider;
use crate::reconciler::{is_noop, plan, Action, PlannedAction};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};
use super::run::load_catalog;

/// The plan command implementation.
pub struct PlanCommand {
    context: CommandContext,
    args: PlanArgs,
}

impl PlanCommand {
    /// Create a new plan command.
    pub fn new(context: CommandContext, args: PlanArgs) -> Self {
        Self { context, args }
    }
}

fn describe(planned: &PlannedAction) -> String {
    match (&planned.action, &planned.state, &planned.error) {
        (_, _, Some(error)) => format!("{}: query failed ({})", planned.name, error),
        (Some(Action::Install), _, _) => {
            format!("{}: install (>= {})", planned.name, planned.min_version)
        }
        (Some(action), Some(state), _) => format!(
            "{}: {} ({} installed, >= {})",
            planned.name, action, state, planned.min_version
        ),
        _ => format!("{}: unknown", planned.name),
    }
}

impl Command for PlanCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(catalog) = load_catalog(&self.context, ui)? else {
            return Ok(CommandResult::failure(2));
        };

        let provider = build_provider(&catalog.config, &self.context.project_root)?;
        let planned = plan(&catalog.entries, self.args.uninstall_existing, &*provider);

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&planned)?);
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} - Plan", catalog.app_name()));
        for item in &planned {
            let line = describe(item);
            match item.action {
                Some(Action::Skip) => ui.message(&format!("  ○ {}", line)),
                Some(_) => ui.message(&format!("  → {}", line)),
                None => ui.warning(&line),
            }
        }

        if is_noop(&planned) {
            ui.success("Nothing to do");
        }

        Ok(CommandResult::success())
    }
}
