pub mod console;
pub mod formula;
pub mod json;
pub mod parse;

use serde::{Deserialize, Serialize};

use crate::descriptor::PackageDescriptor;
use crate::error::{RenderError, Result};
use crate::validator::{CheckReport, Validated, Validator};

pub use formula::class_name;
pub use parse::{parse_formula, ParsedFormula};

/// Output format for a rendered descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Formula,
    Json,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "formula" | "rb" | "ruby" => Some(Self::Formula),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// File extension of files written in this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Formula => "rb",
            Self::Json => "json",
        }
    }
}

/// Output format for check reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Console,
    Json,
}

impl ReportFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Render a validated descriptor into the specified format.
pub fn render(
    validated: &Validated<'_>,
    format: OutputFormat,
) -> std::result::Result<String, RenderError> {
    match format {
        OutputFormat::Formula => Ok(formula::render(validated)),
        OutputFormat::Json => json::render(validated),
    }
}

/// Validate and render in one step. A descriptor that fails validation
/// yields `RenderError::NotValidated` and no text.
pub fn render_descriptor(
    descriptor: &PackageDescriptor,
    validator: &Validator,
    format: OutputFormat,
) -> std::result::Result<String, RenderError> {
    let validated = validator
        .validate(descriptor)
        .map_err(RenderError::NotValidated)?;
    render(&validated, format)
}

/// Render a check report into the specified format.
pub fn render_report(report: &CheckReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Console => Ok(console::render_report(report)),
        ReportFormat::Json => Ok(json::render_report(report)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::{empty_fields, empty_fields_builder};

    #[test]
    fn render_descriptor_refuses_invalid_input() {
        let descriptor = empty_fields_builder().name("").build().unwrap();
        let err = render_descriptor(&descriptor, &Validator::default(), OutputFormat::Formula)
            .unwrap_err();
        match err {
            RenderError::NotValidated(e) => assert_eq!(e.field, "name"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn render_descriptor_matches_two_step_pipeline() {
        let descriptor = empty_fields();
        let validator = Validator::default();
        let one_step =
            render_descriptor(&descriptor, &validator, OutputFormat::Formula).unwrap();
        let two_step = render(&validator.validate(&descriptor).unwrap(), OutputFormat::Formula)
            .unwrap();
        assert_eq!(one_step, two_step);
    }

    #[test]
    fn format_names_are_lenient() {
        assert_eq!(OutputFormat::from_str_lenient("RB"), Some(OutputFormat::Formula));
        assert_eq!(OutputFormat::from_str_lenient("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str_lenient("yaml"), None);
        assert_eq!(ReportFormat::from_str_lenient("text"), Some(ReportFormat::Console));
    }
}
