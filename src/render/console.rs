use crate::validator::{CheckReport, CheckStatus};

/// Render a check report as plain console text, one block per formula.
pub fn render_report(report: &CheckReport) -> String {
    let mut output = String::new();

    if report.entries.is_empty() {
        output.push_str("\n  No formulas configured.\n\n");
        return output;
    }

    output.push_str(&format!("\n  {} formula(s) checked:\n\n", report.entries.len()));

    for entry in &report.entries {
        match &entry.status {
            CheckStatus::Valid => {
                output.push_str(&format!("  [OK]        {}\n", entry.name));
            }
            CheckStatus::Invalid(err) => {
                output.push_str(&format!("  [INVALID]   {} {}\n", entry.name, err.kind));
                output.push_str(&format!("              field: {}\n", err.field));
                output.push_str(&format!("              {}\n", err.message));
            }
            CheckStatus::Malformed(message) => {
                output.push_str(&format!("  [MALFORMED] {}\n", entry.name));
                output.push_str(&format!("              {message}\n"));
            }
        }
    }

    let status = if report.pass() { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "\n  Result: {} ({} of {} failed)\n\n",
        status,
        report.failures(),
        report.entries.len()
    ));

    output
}
