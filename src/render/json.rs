use crate::error::RenderError;
use crate::validator::{CheckReport, Validated};

/// Render a validated descriptor as pretty JSON.
pub fn render(validated: &Validated<'_>) -> Result<String, RenderError> {
    let mut json = serde_json::to_string_pretty(validated.descriptor())?;
    json.push('\n');
    Ok(json)
}

/// Render a check report as pretty JSON.
pub fn render_report(report: &CheckReport) -> Result<String, RenderError> {
    #[derive(serde::Serialize)]
    struct JsonReport<'a> {
        pass: bool,
        failures: usize,
        formulas: &'a [crate::validator::CheckEntry],
    }

    let json = serde_json::to_string_pretty(&JsonReport {
        pass: report.pass(),
        failures: report.failures(),
        formulas: &report.entries,
    })?;
    Ok(json)
}
