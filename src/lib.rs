//! Brewtap: a Homebrew formula generator.
//!
//! Turns release metadata into validated, byte-stable Homebrew formulas.
//! The pipeline per formula is `compute_descriptor` -> `Validator::validate`
//! -> `render::render`, each stage pure and one-way.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use brewtap::{generate_all, GenerateOptions};
//!
//! let options = GenerateOptions::default();
//! let formulas = generate_all(Path::new("brewtap.toml"), &options).unwrap();
//! for formula in &formulas {
//!     println!("{} -> {}", formula.name, formula.path.display());
//! }
//! ```

pub mod config;
pub mod descriptor;
pub mod digest;
pub mod error;
pub mod render;
pub mod validator;

use std::path::{Path, PathBuf};

use config::Config;
use descriptor::{compute_descriptor, Checksum, PackageDescriptor, ReleaseMetadata};
use digest::DigestComputer;
use error::{BrewtapError, Result};
use render::OutputFormat;
use validator::{CheckEntry, CheckReport, CheckStatus, NameRegistry, Policy, Validator};

/// Options for a generate or check invocation.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Output format for generated files.
    pub format: OutputFormat,
    /// Reject unverified checksums regardless of the config policy.
    pub strict: bool,
}

/// A rendered formula and where it belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFormula {
    pub name: String,
    /// Destination path: `<formula_folder>/<name>.<ext>`, relative to the
    /// config file's directory.
    pub path: PathBuf,
    pub contents: String,
}

/// Compute, validate and render one release. Pure: the same metadata
/// always yields the same text.
pub fn generate(
    metadata: &ReleaseMetadata,
    validator: &Validator,
    format: OutputFormat,
) -> Result<String> {
    let descriptor = compute_descriptor(metadata)?;
    let validated = validator.validate(&descriptor)?;
    Ok(render::render(&validated, format)?)
}

/// Digest the local archives a release references and fill in (or verify)
/// the declared checksums. Relative archive paths resolve against `base_dir`.
pub fn resolve_archives(
    metadata: &ReleaseMetadata,
    base_dir: &Path,
    computer: &dyn DigestComputer,
) -> Result<ReleaseMetadata> {
    let mut resolved = metadata.clone();

    if let Some(archive) = &metadata.archive {
        resolved.checksum = Some(resolve_checksum(
            metadata.checksum.as_deref(),
            &base_dir.join(archive),
            computer,
        )?);
    }
    for target in &mut resolved.targets {
        if let Some(archive) = &target.archive {
            target.checksum = Some(resolve_checksum(
                target.checksum.as_deref(),
                &base_dir.join(archive),
                computer,
            )?);
        }
    }

    Ok(resolved)
}

fn resolve_checksum(
    declared: Option<&str>,
    archive: &Path,
    computer: &dyn DigestComputer,
) -> Result<String> {
    let actual = computer.digest_file(archive)?;
    if let Some(declared) = declared {
        let declared = Checksum::parse(declared);
        if !declared.is_unverified() && !declared.hex.eq_ignore_ascii_case(&actual.hex) {
            return Err(BrewtapError::ChecksumMismatch {
                path: archive.display().to_string(),
                declared: declared.hex,
                actual: actual.hex,
            });
        }
    }
    Ok(actual.hex)
}

fn load_config(config_path: &Path, options: &GenerateOptions) -> Result<(Config, Validator)> {
    let config = Config::load(config_path)?;
    let policy = if options.strict {
        Policy::strict()
    } else {
        config.policy.clone()
    };
    Ok((config, Validator::new(policy)))
}

/// Resolve archives and build descriptors for every configured formula.
pub fn load_descriptors(config: &Config, base_dir: &Path) -> Result<Vec<PackageDescriptor>> {
    let computer = digest::computer_for(Default::default());
    config
        .formula
        .iter()
        .map(|metadata| -> Result<PackageDescriptor> {
            let resolved = resolve_archives(metadata, base_dir, computer.as_ref())?;
            compute_descriptor(&resolved)
        })
        .collect()
}

/// Generate every formula in a config file.
///
/// All formulas are validated and rendered before anything is returned, so
/// a single failure yields an error and no output.
pub fn generate_all(
    config_path: &Path,
    options: &GenerateOptions,
) -> Result<Vec<GeneratedFormula>> {
    let (config, validator) = load_config(config_path, options)?;
    if config.formula.is_empty() {
        return Err(BrewtapError::Config(format!(
            "no [[formula]] entries in {}",
            config_path.display()
        )));
    }

    let base_dir = Config::base_dir(config_path);
    let descriptors = load_descriptors(&config, base_dir)?;
    let validated = validator.validate_registry(&descriptors)?;

    let folder = base_dir.join(&config.formula_folder);
    validated
        .iter()
        .map(|v| -> Result<GeneratedFormula> {
            let name = v.descriptor().name().to_string();
            let contents = render::render(v, options.format)?;
            let path = folder.join(format!("{name}.{}", options.format.extension()));
            tracing::info!(name = %name, path = %path.display(), "formula generated");
            Ok(GeneratedFormula {
                name,
                path,
                contents,
            })
        })
        .collect()
}

/// Write generated formulas to their paths, or into `output_dir` when
/// given. Returns the paths written.
///
/// Every file is first written to a `.tmp` sibling; only when all of them
/// are on disk are they renamed into place. A failed write removes the
/// staged files and leaves existing formulas untouched.
pub fn write_formulas(
    formulas: &[GeneratedFormula],
    output_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = formulas
        .iter()
        .map(|formula| match (output_dir, formula.path.file_name()) {
            (Some(dir), Some(file_name)) => dir.join(file_name),
            _ => formula.path.clone(),
        })
        .collect();

    let mut staged: Vec<PathBuf> = Vec::with_capacity(targets.len());
    for (formula, target) in formulas.iter().zip(&targets) {
        let tmp = staging_path(target);
        let written = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
            _ => Ok(()),
        }
        .and_then(|()| std::fs::write(&tmp, &formula.contents));
        if let Err(e) = written {
            for path in staged.iter().chain(std::iter::once(&tmp)) {
                let _ = std::fs::remove_file(path);
            }
            return Err(e.into());
        }
        staged.push(tmp);
    }

    for (tmp, target) in staged.iter().zip(&targets) {
        std::fs::rename(tmp, target)?;
        tracing::debug!(path = %target.display(), "formula written");
    }
    Ok(targets)
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Check every formula in a config file without stopping at the first
/// failure.
pub fn check(config_path: &Path, options: &GenerateOptions) -> Result<CheckReport> {
    let (config, validator) = load_config(config_path, options)?;
    let base_dir = Config::base_dir(config_path);
    let computer = digest::computer_for(Default::default());
    let mut registry = NameRegistry::default();

    let entries = config
        .formula
        .iter()
        .map(|metadata| {
            let descriptor = resolve_archives(metadata, base_dir, computer.as_ref())
                .and_then(|resolved| compute_descriptor(&resolved));
            match descriptor {
                Ok(descriptor) => CheckEntry {
                    name: descriptor.name().to_string(),
                    status: validator.check_one(&descriptor, &mut registry),
                },
                Err(e) => CheckEntry {
                    name: metadata
                        .name
                        .clone()
                        .unwrap_or_else(|| "<unnamed>".into()),
                    status: CheckStatus::Malformed(e.to_string()),
                },
            }
        })
        .collect();

    Ok(CheckReport { entries })
}
