use crate::descriptor::PackageDescriptor;
use crate::validator::{Policy, Rule, RuleMetadata, ValidationError, ValidationErrorKind};

/// FORMULA-005: install steps
pub struct InstallStepsRule;

impl Rule for InstallStepsRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-005".into(),
            name: "Install steps".into(),
            description: "At least one install step, each with a source path".into(),
            kinds: vec![
                ValidationErrorKind::NoInstallSteps,
                ValidationErrorKind::InvalidInstallStep,
            ],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        _policy: &Policy,
    ) -> Result<(), ValidationError> {
        let steps = descriptor.install_steps();
        if steps.is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::NoInstallSteps,
                "install_steps",
                "formula installs nothing",
            ));
        }

        for (i, step) in steps.iter().enumerate() {
            if step.source_path.trim().is_empty() {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidInstallStep,
                    format!("install_steps[{i}].source"),
                    "source path is empty",
                ));
            }
            if step.installed_name.contains('/') {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidInstallStep,
                    format!("install_steps[{i}].as"),
                    format!(
                        "installed name '{}' must be a file name, not a path",
                        step.installed_name
                    ),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::empty_fields_builder;
    use crate::descriptor::InstallStep;

    #[test]
    fn installed_name_with_slash_is_rejected() {
        let descriptor = empty_fields_builder()
            .install_steps(vec![InstallStep::new("bin/tool", "sub/tool")])
            .build()
            .unwrap();
        let err = InstallStepsRule
            .check(&descriptor, &Policy::default())
            .unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidInstallStep);
        assert_eq!(err.field, "install_steps[0].as");
    }

    #[test]
    fn empty_installed_name_keeps_source_name() {
        let descriptor = empty_fields_builder()
            .install_steps(vec![InstallStep::new("bin/tool", "")])
            .build()
            .unwrap();
        assert!(InstallStepsRule
            .check(&descriptor, &Policy::default())
            .is_ok());
    }
}
