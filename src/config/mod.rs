use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::descriptor::ReleaseMetadata;
use crate::error::Result;
use crate::validator::Policy;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "brewtap.toml";

/// Top-level configuration from `brewtap.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Folder formulas are written to, relative to the config file.
    #[serde(default = "default_formula_folder")]
    pub formula_folder: PathBuf,
    #[serde(default)]
    pub policy: Policy,
    /// One entry per `[[formula]]` table.
    #[serde(default)]
    pub formula: Vec<ReleaseMetadata>,
}

fn default_formula_folder() -> PathBuf {
    PathBuf::from("formula")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            formula_folder: default_formula_folder(),
            policy: Policy::default(),
            formula: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Directory relative paths in the config are resolved against.
    pub fn base_dir(config_path: &Path) -> &Path {
        config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r##"# Brewtap configuration
# Each [[formula]] table describes one release to turn into a Homebrew formula.

# Folder generated formulas are written to.
formula_folder = "formula"

[policy]
# Refuse the all-zero "unverified" checksum.
reject_unverified = false

[[formula]]
name = "my-tool"
description = "Does one thing well"
homepage = "https://github.com/owner/my-tool"
tag = "v0.1.0"
archive_base_url = "https://github.com/owner/my-tool/archive"
# Either a hex digest, "unverified", or a local archive to digest:
# archive = "dist/v0.1.0.tar.gz"
checksum = "unverified"
license = "MIT"
install = [{ source = "src/my-tool.sh", as = "my-tool" }]
# depends_on = ["jq", { name = "go", kind = "build" }]
# test = 'assert_match version.to_s, shell_output("#{bin}/my-tool --version")'

# Per-platform archives from the release's uploaded assets.
# download_base_url = "https://github.com/owner/my-tool/releases/download"
# [[formula.targets]]
# platform = "darwin_arm64"
# checksum = "unverified"
"##
    }
}
