//! Package descriptor model.
//!
//! A `PackageDescriptor` is the value every later stage works on: the
//! validator checks it and the renderer turns it into formula text. It is
//! built once through `DescriptorBuilder` and never mutated afterwards.

pub mod checksum;
pub mod release;
pub mod target;

use serde::{Deserialize, Serialize};

use crate::error::{BrewtapError, Result};

pub use checksum::{Checksum, DigestAlgorithm};
pub use release::{compute_descriptor, ArchiveFormat, ReleaseMetadata, TargetMetadata};
pub use target::{Arch, Os, Platform, PlatformArchive};

/// Description used when the upstream project has none.
pub const PLACEHOLDER_DESCRIPTION: &str = "NA";

/// A file placed into the installation prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallStep {
    /// Path inside the archive.
    #[serde(rename = "source")]
    pub source_path: String,
    /// Name under `bin/`. Empty keeps the source file name.
    #[serde(rename = "as", default)]
    pub installed_name: String,
}

impl InstallStep {
    pub fn new(source_path: impl Into<String>, installed_name: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            installed_name: installed_name.into(),
        }
    }
}

/// When a dependency is needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    #[default]
    Runtime,
    Build,
    Test,
    Optional,
    Recommended,
}

impl DependencyKind {
    /// Ruby symbol appended to `depends_on`, if any.
    pub fn symbol(self) -> Option<&'static str> {
        match self {
            Self::Runtime => None,
            Self::Build => Some(":build"),
            Self::Test => Some(":test"),
            Self::Optional => Some(":optional"),
            Self::Recommended => Some(":recommended"),
        }
    }
}

/// A `depends_on` entry. Configs may give either a bare formula name or
/// a `{ name, kind }` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DependencySpec")]
pub struct Dependency {
    pub name: String,
    pub kind: DependencyKind,
}

impl Dependency {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DependencySpec {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        kind: DependencyKind,
    },
}

impl From<DependencySpec> for Dependency {
    fn from(spec: DependencySpec) -> Self {
        match spec {
            DependencySpec::Name(name) => Self::new(name, DependencyKind::Runtime),
            DependencySpec::Full { name, kind } => Self::new(name, kind),
        }
    }
}

/// Everything needed to render one formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
    name: String,
    description: String,
    homepage_url: String,
    source_url: String,
    checksum: Checksum,
    install_steps: Vec<InstallStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_require: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    includes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dependencies: Vec<Dependency>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    targets: Vec<PlatformArchive>,
    #[serde(skip_serializing_if = "Option::is_none")]
    test: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caveats: Option<String>,
}

impl PackageDescriptor {
    pub fn builder() -> DescriptorBuilder {
        DescriptorBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the description is the `NA` placeholder.
    pub fn has_placeholder_description(&self) -> bool {
        self.description == PLACEHOLDER_DESCRIPTION
    }

    pub fn homepage_url(&self) -> &str {
        &self.homepage_url
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    pub fn install_steps(&self) -> &[InstallStep] {
        &self.install_steps
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn download_strategy(&self) -> Option<&str> {
        self.download_strategy.as_deref()
    }

    pub fn custom_require(&self) -> Option<&str> {
        self.custom_require.as_deref()
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn targets(&self) -> &[PlatformArchive] {
        &self.targets
    }

    pub fn test(&self) -> Option<&str> {
        self.test.as_deref()
    }

    pub fn caveats(&self) -> Option<&str> {
        self.caveats.as_deref()
    }
}

/// Builder for `PackageDescriptor`.
///
/// `build` fails with `MalformedDescriptor` for a required field that was
/// never set. Empty values are accepted here and left to the validator.
#[derive(Debug, Clone, Default)]
pub struct DescriptorBuilder {
    name: Option<String>,
    description: Option<String>,
    homepage_url: Option<String>,
    source_url: Option<String>,
    checksum: Option<Checksum>,
    install_steps: Option<Vec<InstallStep>>,
    version: Option<String>,
    license: Option<String>,
    download_strategy: Option<String>,
    custom_require: Option<String>,
    includes: Vec<String>,
    dependencies: Vec<Dependency>,
    targets: Vec<PlatformArchive>,
    test: Option<String>,
    caveats: Option<String>,
}

impl DescriptorBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn homepage_url(mut self, url: impl Into<String>) -> Self {
        self.homepage_url = Some(url.into());
        self
    }

    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    pub fn checksum(mut self, checksum: Checksum) -> Self {
        self.checksum = Some(checksum);
        self
    }

    pub fn install_steps(mut self, steps: Vec<InstallStep>) -> Self {
        self.install_steps = Some(steps);
        self
    }

    pub fn install_step(mut self, step: InstallStep) -> Self {
        self.install_steps.get_or_insert_with(Vec::new).push(step);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn download_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.download_strategy = Some(strategy.into());
        self
    }

    pub fn custom_require(mut self, path: impl Into<String>) -> Self {
        self.custom_require = Some(path.into());
        self
    }

    pub fn include(mut self, module: impl Into<String>) -> Self {
        self.includes.push(module.into());
        self
    }

    pub fn dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn target(mut self, target: PlatformArchive) -> Self {
        self.targets.push(target);
        self
    }

    pub fn test(mut self, body: impl Into<String>) -> Self {
        self.test = Some(body.into());
        self
    }

    pub fn caveats(mut self, text: impl Into<String>) -> Self {
        self.caveats = Some(text.into());
        self
    }

    pub fn build(self) -> Result<PackageDescriptor> {
        Ok(PackageDescriptor {
            name: required(self.name, "name")?,
            description: required(self.description, "description")?,
            homepage_url: required(self.homepage_url, "homepage_url")?,
            source_url: required(self.source_url, "source_url")?,
            checksum: required(self.checksum, "checksum")?,
            install_steps: required(self.install_steps, "install_steps")?,
            version: self.version,
            license: self.license,
            download_strategy: self.download_strategy,
            custom_require: self.custom_require,
            includes: self.includes,
            dependencies: self.dependencies,
            targets: self.targets,
            test: self.test,
            caveats: self.caveats,
        })
    }
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T> {
    value.ok_or(BrewtapError::MalformedDescriptor { field })
}
