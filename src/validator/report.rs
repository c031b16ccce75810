use serde::Serialize;

use super::ValidationError;

/// Outcome of checking one formula.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum CheckStatus {
    Valid,
    /// Failed a validation rule.
    Invalid(ValidationError),
    /// Could not be built into a descriptor at all.
    Malformed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub name: String,
    #[serde(flatten)]
    pub status: CheckStatus,
}

/// Per-formula results of `brewtap check`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub entries: Vec<CheckEntry>,
}

impl CheckReport {
    pub fn pass(&self) -> bool {
        self.failures() == 0
    }

    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !matches!(e.status, CheckStatus::Valid))
            .count()
    }
}
