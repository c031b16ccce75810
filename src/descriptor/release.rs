//! Release metadata and the mapping from a release to a descriptor.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{
    Checksum, Dependency, DescriptorBuilder, InstallStep, PackageDescriptor, Platform,
    PlatformArchive, PLACEHOLDER_DESCRIPTION,
};
use crate::error::{BrewtapError, Result};

/// Archive type of the auto-generated source download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[default]
    #[serde(rename = "tar.gz")]
    TarGz,
    #[serde(rename = "zip")]
    Zip,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

/// A platform archive as configured. Either `url` is given, or the URL is
/// built from the release download base, the tag and `asset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetMetadata {
    pub platform: Platform,
    #[serde(default)]
    pub url: Option<String>,
    /// Release asset file name. Defaults to `<name>-<version>-<os>-<arch>.tar.gz`.
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub checksum: Option<String>,
    /// Local copy of the asset to digest.
    #[serde(default)]
    pub archive: Option<PathBuf>,
}

impl TargetMetadata {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            url: None,
            asset: None,
            checksum: None,
            archive: None,
        }
    }
}

/// Metadata describing one upstream release, usually one `[[formula]]`
/// table of `brewtap.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseMetadata {
    #[serde(default)]
    pub name: Option<String>,
    /// Missing or blank descriptions become `NA`.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    /// Release tag, e.g. `v0.1.0`.
    #[serde(default)]
    pub tag: Option<String>,
    /// Base of the auto-generated archives, e.g.
    /// `https://github.com/owner/repo/archive`.
    #[serde(default)]
    pub archive_base_url: Option<String>,
    /// Base of uploaded release assets, e.g.
    /// `https://github.com/owner/repo/releases/download`.
    #[serde(default)]
    pub download_base_url: Option<String>,
    /// Explicit source URL; overrides `archive_base_url` + `tag`.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archive_format: ArchiveFormat,
    /// Hex digest, or `unverified` for the all-zero sentinel.
    #[serde(default)]
    pub checksum: Option<String>,
    /// Local copy of the source archive to digest.
    #[serde(default)]
    pub archive: Option<PathBuf>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub install: Option<Vec<InstallStep>>,
    #[serde(default)]
    pub depends_on: Vec<Dependency>,
    #[serde(default)]
    pub targets: Vec<TargetMetadata>,
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub caveats: Option<String>,
    #[serde(default)]
    pub download_strategy: Option<String>,
    #[serde(default)]
    pub custom_require: Option<String>,
    #[serde(default)]
    pub includes: Vec<String>,
}

impl ReleaseMetadata {
    /// Tag without a leading `v`.
    pub fn version_from_tag(&self) -> Option<&str> {
        self.tag.as_deref().map(|tag| tag.strip_prefix('v').unwrap_or(tag))
    }

    /// URL of the default source archive, if it can be determined.
    pub fn source_url(&self) -> Option<String> {
        if let Some(url) = &self.url {
            return Some(url.clone());
        }
        let base = self.archive_base_url.as_deref()?;
        let tag = self.tag.as_deref()?;
        Some(format!(
            "{}/{}.{}",
            base.trim_end_matches('/'),
            tag,
            self.archive_format.extension()
        ))
    }

    fn target_url(&self, target: &TargetMetadata) -> Result<String> {
        if let Some(url) = &target.url {
            return Ok(url.clone());
        }
        let (Some(base), Some(tag)) = (self.download_base_url.as_deref(), self.tag.as_deref())
        else {
            return Err(BrewtapError::Config(format!(
                "target {} needs `url`, or `download_base_url` and `tag` on its formula",
                target.platform
            )));
        };
        let asset = match &target.asset {
            Some(asset) => asset.clone(),
            None => format!(
                "{}-{}-{}.tar.gz",
                self.name.as_deref().unwrap_or_default(),
                self.version_from_tag().unwrap_or_default(),
                target.platform.asset_suffix()
            ),
        };
        Ok(format!("{}/{}/{}", base.trim_end_matches('/'), tag, asset))
    }
}

/// Build a descriptor from release metadata.
///
/// Pure: archives referenced by path must already have been digested into
/// `checksum` (see `crate::resolve_archives`).
pub fn compute_descriptor(metadata: &ReleaseMetadata) -> Result<PackageDescriptor> {
    let mut builder = DescriptorBuilder::default();

    if let Some(name) = &metadata.name {
        builder = builder.name(name.trim());
    }

    let description = metadata
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(PLACEHOLDER_DESCRIPTION);
    builder = builder.description(description);

    if let Some(homepage) = &metadata.homepage {
        builder = builder.homepage_url(homepage.trim());
    }
    if let Some(url) = metadata.source_url() {
        builder = builder.source_url(url);
    }
    if let Some(checksum) = &metadata.checksum {
        builder = builder.checksum(Checksum::parse(checksum));
    }
    if let Some(steps) = &metadata.install {
        builder = builder.install_steps(steps.clone());
    }
    if let Some(version) = &metadata.version {
        builder = builder.version(version);
    }
    if let Some(license) = &metadata.license {
        builder = builder.license(license);
    }
    if let Some(strategy) = &metadata.download_strategy {
        builder = builder.download_strategy(strategy);
    }
    if let Some(require) = &metadata.custom_require {
        builder = builder.custom_require(require);
    }
    if let Some(test) = &metadata.test {
        builder = builder.test(test);
    }
    if let Some(caveats) = &metadata.caveats {
        builder = builder.caveats(caveats);
    }
    for module in &metadata.includes {
        builder = builder.include(module);
    }
    for dependency in &metadata.depends_on {
        builder = builder.dependency(dependency.clone());
    }
    for target in &metadata.targets {
        let checksum = target
            .checksum
            .as_deref()
            .map(Checksum::parse)
            .ok_or(BrewtapError::MalformedDescriptor {
                field: "targets.checksum",
            })?;
        builder = builder.target(PlatformArchive {
            platform: target.platform,
            url: metadata.target_url(target)?,
            checksum,
        });
    }

    builder.build()
}
