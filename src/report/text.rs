//! Human-readable report rendering.

use crate::reconciler::{InstallReport, OutcomeKind, OutcomeRecord};
use crate::ui::{format_duration, ProvisionTheme};

/// Group title for an outcome kind.
fn group_title(kind: OutcomeKind) -> &'static str {
    match kind {
        OutcomeKind::Success => "Installed",
        OutcomeKind::Updated => "Updated",
        OutcomeKind::Skipped => "Already up to date",
        OutcomeKind::Failed => "Failed",
    }
}

/// One line describing a record.
pub fn record_line(record: &OutcomeRecord) -> String {
    match (&record.failure, &record.version) {
        (Some(failure), _) => format!("{}: {} ({})", record.name, record.detail, failure),
        (None, Some(version)) if record.kind == OutcomeKind::Success => {
            format!("{} {}", record.name, version)
        }
        _ => format!("{}: {}", record.name, record.detail),
    }
}

/// Render a report as lines of text.
///
/// Records are grouped by outcome in the order Success, Updated, Skipped,
/// Failed, keeping catalog order within each group. Empty groups are
/// omitted. The last line holds the totals.
pub fn render(report: &InstallReport, theme: &ProvisionTheme) -> Vec<String> {
    let mut lines = Vec::new();

    for kind in OutcomeKind::ALL {
        let records: Vec<&OutcomeRecord> = report.records_of(kind).collect();
        if records.is_empty() {
            continue;
        }

        lines.push(format!(
            "{} {}",
            theme.highlight.apply_to(group_title(kind)),
            theme.dim.apply_to(format!("({})", records.len()))
        ));
        for record in records {
            lines.push(format!("  {}", theme.format_outcome(kind, &record_line(record))));
        }
        lines.push(String::new());
    }

    lines.push(totals_line(report, theme));
    lines
}

/// `N installed · N updated · N skipped · N failed · 1.2s`
pub fn totals_line(report: &InstallReport, theme: &ProvisionTheme) -> String {
    let counts = report.counts();
    let duration = report
        .duration()
        .to_std()
        .map(format_duration)
        .unwrap_or_default();
    let sep = theme.dim.apply_to("·");

    let failed = format!("{} failed", counts.failed);
    let failed = if counts.failed > 0 {
        theme.error.apply_to(failed).to_string()
    } else {
        failed
    };

    format!(
        "{} installed {} {} updated {} {} skipped {} {} {} {}",
        counts.success,
        sep,
        counts.updated,
        sep,
        counts.skipped,
        sep,
        failed,
        sep,
        theme.duration.apply_to(duration)
    )
}
