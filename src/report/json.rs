//! JSON report rendering.

use serde::Serialize;

use crate::error::Result;
use crate::reconciler::{InstallReport, ReportCounts};

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a InstallReport,
    counts: ReportCounts,
    duration_ms: i64,
}

/// Render a report as pretty-printed JSON, with totals.
pub fn render(report: &InstallReport) -> Result<String> {
    let json = JsonReport {
        report,
        counts: report.counts(),
        duration_ms: report.duration().num_milliseconds(),
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
