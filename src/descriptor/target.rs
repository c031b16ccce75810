use serde::{Deserialize, Serialize};

use super::Checksum;

/// Platforms a formula can ship a dedicated archive for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    DarwinAmd64,
    DarwinArm64,
    LinuxAmd64,
    LinuxArm64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Os {
    MacOs,
    Linux,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Arch {
    Intel,
    Arm,
}

impl Platform {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "darwin_amd64" | "darwin_x86_64" | "macos_amd64" => Some(Self::DarwinAmd64),
            "darwin_arm64" | "darwin_aarch64" | "macos_arm64" => Some(Self::DarwinArm64),
            "linux_amd64" | "linux_x86_64" => Some(Self::LinuxAmd64),
            "linux_arm64" | "linux_aarch64" => Some(Self::LinuxArm64),
            _ => None,
        }
    }

    pub fn os(self) -> Os {
        match self {
            Self::DarwinAmd64 | Self::DarwinArm64 => Os::MacOs,
            Self::LinuxAmd64 | Self::LinuxArm64 => Os::Linux,
        }
    }

    pub fn arch(self) -> Arch {
        match self {
            Self::DarwinAmd64 | Self::LinuxAmd64 => Arch::Intel,
            Self::DarwinArm64 | Self::LinuxArm64 => Arch::Arm,
        }
    }

    /// Suffix used in default release asset names, e.g. `darwin-arm64`.
    pub fn asset_suffix(self) -> &'static str {
        match self {
            Self::DarwinAmd64 => "darwin-amd64",
            Self::DarwinArm64 => "darwin-arm64",
            Self::LinuxAmd64 => "linux-amd64",
            Self::LinuxArm64 => "linux-arm64",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DarwinAmd64 => write!(f, "darwin_amd64"),
            Self::DarwinArm64 => write!(f, "darwin_arm64"),
            Self::LinuxAmd64 => write!(f, "linux_amd64"),
            Self::LinuxArm64 => write!(f, "linux_arm64"),
        }
    }
}

impl Os {
    /// Homebrew block opened for this OS.
    pub fn block(self) -> &'static str {
        match self {
            Self::MacOs => "on_macos",
            Self::Linux => "on_linux",
        }
    }
}

impl Arch {
    /// Homebrew block opened for this architecture.
    pub fn block(self) -> &'static str {
        match self {
            Self::Intel => "on_intel",
            Self::Arm => "on_arm",
        }
    }
}

/// A per-platform archive that overrides the default `url`/checksum pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformArchive {
    pub platform: Platform,
    pub url: String,
    pub checksum: Checksum,
}
