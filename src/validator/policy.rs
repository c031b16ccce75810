use serde::{Deserialize, Serialize};

/// Validation policy loaded from the `[policy]` table of `brewtap.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Treat the all-zero "unverified" checksum as invalid.
    #[serde(default)]
    pub reject_unverified: bool,
}

impl Policy {
    pub fn strict() -> Self {
        Self {
            reject_unverified: true,
        }
    }
}
