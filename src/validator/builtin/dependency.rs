use crate::descriptor::PackageDescriptor;
use crate::validator::{Policy, Rule, RuleMetadata, ValidationError, ValidationErrorKind};

/// FORMULA-006: dependencies
pub struct DependencyRule;

impl Rule for DependencyRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-006".into(),
            name: "Dependencies".into(),
            description: "Every depends_on entry names a formula".into(),
            kinds: vec![ValidationErrorKind::InvalidDependency],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        _policy: &Policy,
    ) -> Result<(), ValidationError> {
        for (i, dep) in descriptor.dependencies().iter().enumerate() {
            if dep.name.trim().is_empty() {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidDependency,
                    format!("depends_on[{i}].name"),
                    "dependency name is empty",
                ));
            }
        }
        Ok(())
    }
}
