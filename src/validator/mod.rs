//! Descriptor validation.
//!
//! The validator runs every registered rule in order and stops at the first
//! failure. A successful run yields a `Validated` token, the only input the
//! renderer accepts.

pub mod builtin;
pub mod policy;
pub mod report;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::PackageDescriptor;
use crate::render::class_name;

pub use policy::Policy;
pub use report::{CheckEntry, CheckReport, CheckStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    EmptyName,
    InvalidName,
    InvalidUrl,
    InvalidChecksum,
    NoInstallSteps,
    InvalidInstallStep,
    InvalidDependency,
    DuplicateTarget,
    DuplicateName,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::EmptyName => "EmptyName",
            Self::InvalidName => "InvalidName",
            Self::InvalidUrl => "InvalidUrl",
            Self::InvalidChecksum => "InvalidChecksum",
            Self::NoInstallSteps => "NoInstallSteps",
            Self::InvalidInstallStep => "InvalidInstallStep",
            Self::InvalidDependency => "InvalidDependency",
            Self::DuplicateTarget => "DuplicateTarget",
            Self::DuplicateName => "DuplicateName",
        };
        f.write_str(s)
    }
}

/// The first rule a descriptor failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind} in `{field}`: {message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    /// Offending field, e.g. `homepage_url` or `install_steps[1].source`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Metadata about a validation rule, used for `list-rules` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleMetadata {
    pub id: String,
    pub name: String,
    pub description: String,
    pub kinds: Vec<ValidationErrorKind>,
}

/// A rule checks one aspect of a descriptor.
pub trait Rule: Send + Sync {
    fn metadata(&self) -> RuleMetadata;

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        policy: &Policy,
    ) -> Result<(), ValidationError>;
}

/// Proof that a descriptor passed validation.
#[derive(Debug, Clone, Copy)]
pub struct Validated<'a> {
    descriptor: &'a PackageDescriptor,
}

impl<'a> Validated<'a> {
    pub fn descriptor(&self) -> &'a PackageDescriptor {
        self.descriptor
    }
}

/// Runs all registered rules against descriptors.
pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
    policy: Policy,
}

impl Validator {
    /// Create a validator with all built-in rules registered.
    pub fn new(policy: Policy) -> Self {
        Self {
            rules: builtin::all_rules(),
            policy,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Fail-fast check of a single descriptor.
    pub fn validate<'a>(
        &self,
        descriptor: &'a PackageDescriptor,
    ) -> Result<Validated<'a>, ValidationError> {
        for rule in &self.rules {
            rule.check(descriptor, &self.policy)?;
        }
        tracing::debug!(name = descriptor.name(), "descriptor validated");
        Ok(Validated { descriptor })
    }

    /// Validate every descriptor and require unique names. Stops at the
    /// first failure.
    pub fn validate_registry<'a>(
        &self,
        descriptors: &'a [PackageDescriptor],
    ) -> Result<Vec<Validated<'a>>, ValidationError> {
        let mut registry = NameRegistry::default();
        let mut validated = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            validated.push(self.validate(descriptor)?);
            registry.register(descriptor)?;
        }
        Ok(validated)
    }

    /// Status of one descriptor within a registry being checked.
    pub fn check_one(
        &self,
        descriptor: &PackageDescriptor,
        registry: &mut NameRegistry,
    ) -> CheckStatus {
        match self
            .validate(descriptor)
            .and_then(|_| registry.register(descriptor))
        {
            Ok(()) => CheckStatus::Valid,
            Err(e) => CheckStatus::Invalid(e),
        }
    }

    /// Validate every descriptor without stopping, collecting one entry
    /// per descriptor.
    pub fn check<'a>(
        &self,
        descriptors: impl IntoIterator<Item = &'a PackageDescriptor>,
    ) -> CheckReport {
        let mut registry = NameRegistry::default();
        let entries = descriptors
            .into_iter()
            .map(|descriptor| CheckEntry {
                name: descriptor.name().to_string(),
                status: self.check_one(descriptor, &mut registry),
            })
            .collect();
        CheckReport { entries }
    }

    /// List metadata for all registered rules.
    pub fn list_rules(&self) -> Vec<RuleMetadata> {
        self.rules.iter().map(|r| r.metadata()).collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(Policy::default())
    }
}

/// Formula class names already taken in one registry, mapped to the
/// formula name that took them.
#[derive(Debug, Default)]
pub struct NameRegistry {
    classes: HashMap<String, String>,
}

impl NameRegistry {
    /// Record the descriptor's class name, failing with `DuplicateName` if
    /// an earlier formula renders to the same class.
    pub fn register(&mut self, descriptor: &PackageDescriptor) -> Result<(), ValidationError> {
        let name = descriptor.name();
        let class = class_name(name);
        match self.classes.get(&class) {
            Some(earlier) if earlier == name => Err(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                "name",
                format!("formula '{name}' is defined more than once"),
            )),
            Some(earlier) => Err(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                "name",
                format!("formula '{name}' and '{earlier}' both render as class {class}"),
            )),
            None => {
                self.classes.insert(class, name.to_string());
                Ok(())
            }
        }
    }
}

/// Validate with the default policy.
pub fn validate(descriptor: &PackageDescriptor) -> Result<Validated<'_>, ValidationError> {
    Validator::default().validate(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::{empty_fields, empty_fields_builder};
    use crate::descriptor::{Checksum, DigestAlgorithm, InstallStep};

    fn kind_of(descriptor: &PackageDescriptor) -> ValidationErrorKind {
        validate(descriptor).unwrap_err().kind
    }

    #[test]
    fn placeholder_description_and_sentinel_checksum_pass() {
        let descriptor = empty_fields();
        assert!(validate(&descriptor).is_ok());
    }

    #[test]
    fn empty_name_fails_first() {
        let descriptor = empty_fields_builder()
            .name("")
            .homepage_url("not a url")
            .build()
            .unwrap();
        let err = validate(&descriptor).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::EmptyName);
        assert_eq!(err.field, "name");
    }

    #[test]
    fn bad_checksum_is_invalid_checksum() {
        let bad: [String; 4] = [
            "abc".into(),
            "A".repeat(64),
            "g".repeat(64),
            "0".repeat(63),
        ];
        for hex in bad {
            let descriptor = empty_fields_builder()
                .checksum(Checksum::sha256(hex))
                .build()
                .unwrap();
            assert_eq!(kind_of(&descriptor), ValidationErrorKind::InvalidChecksum);
        }
    }

    #[test]
    fn empty_install_steps_fail() {
        let descriptor = empty_fields_builder().install_steps(vec![]).build().unwrap();
        assert_eq!(kind_of(&descriptor), ValidationErrorKind::NoInstallSteps);
    }

    #[test]
    fn blank_install_source_fails() {
        let descriptor = empty_fields_builder()
            .install_step(InstallStep::new("  ", "x"))
            .build()
            .unwrap();
        let err = validate(&descriptor).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidInstallStep);
        assert_eq!(err.field, "install_steps[1].source");
    }

    #[test]
    fn strict_policy_rejects_sentinel() {
        let validator = Validator::new(Policy {
            reject_unverified: true,
        });
        let descriptor = empty_fields();
        let err = validator.validate(&descriptor).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidChecksum);

        let verified = empty_fields_builder()
            .checksum(Checksum::new(DigestAlgorithm::Sha256, "ab".repeat(32)))
            .build()
            .unwrap();
        assert!(validator.validate(&verified).is_ok());
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let descriptors = vec![empty_fields(), empty_fields()];
        let err = Validator::default()
            .validate_registry(&descriptors)
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DuplicateName);
    }

    #[test]
    fn registry_rejects_names_sharing_a_class() {
        let descriptors = vec![
            empty_fields_builder().name("foo-bar").build().unwrap(),
            empty_fields_builder().name("foo_bar").build().unwrap(),
        ];
        let err = Validator::default()
            .validate_registry(&descriptors)
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DuplicateName);
        assert!(err.message.contains("FooBar"));
    }

    #[test]
    fn check_collects_every_descriptor() {
        let bad = empty_fields_builder().install_steps(vec![]).build().unwrap();
        let good = empty_fields_builder().name("other").build().unwrap();
        let report = Validator::default().check([&bad, &good]);
        assert_eq!(report.entries.len(), 2);
        assert!(!report.pass());
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn rules_are_listed_in_check_order() {
        let ids: Vec<String> = Validator::default()
            .list_rules()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.first().map(String::as_str), Some("FORMULA-001"));
    }
}
