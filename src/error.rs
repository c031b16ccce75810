use thiserror::Error;

use crate::validator::ValidationError;

pub type Result<T> = std::result::Result<T, BrewtapError>;

#[derive(Error, Debug)]
pub enum BrewtapError {
    #[error("Malformed descriptor: required field `{field}` was never set")]
    MalformedDescriptor { field: &'static str },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Checksum mismatch for {path}: declared {declared}, archive digest is {actual}")]
    ChecksumMismatch {
        path: String,
        declared: String,
        actual: String,
    },

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl BrewtapError {
    /// Process exit code for this error. Descriptor problems exit with 1,
    /// environment and IO problems with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::MalformedDescriptor { .. }
            | Self::Validation(_)
            | Self::Render(_)
            | Self::ChecksumMismatch { .. } => 1,
            _ => 2,
        }
    }
}

/// Failures of the render stage.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("descriptor has not passed validation ({0})")]
    NotValidated(ValidationError),

    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
