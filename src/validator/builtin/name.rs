use once_cell::sync::Lazy;
use regex::Regex;

use crate::descriptor::PackageDescriptor;
use crate::render::class_name;
use crate::validator::{Policy, Rule, RuleMetadata, ValidationError, ValidationErrorKind};

/// Formula names Homebrew can turn into a Ruby class name.
static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+@._-]*$").unwrap());

/// A Ruby constant, which the normalized class name must be.
static CLASS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z0-9_]*$").unwrap());

/// FORMULA-001: formula name
pub struct NameRule;

impl Rule for NameRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-001".into(),
            name: "Formula name".into(),
            description: "Name is non-empty and maps to a valid formula class name".into(),
            kinds: vec![
                ValidationErrorKind::EmptyName,
                ValidationErrorKind::InvalidName,
            ],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        _policy: &Policy,
    ) -> Result<(), ValidationError> {
        let name = descriptor.name();
        if name.trim().is_empty() {
            return Err(ValidationError::new(
                ValidationErrorKind::EmptyName,
                "name",
                "formula name is empty",
            ));
        }
        if !NAME_RE.is_match(name) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidName,
                "name",
                format!(
                    "'{name}' must start with a letter and contain only letters, digits, '+', '@', '.', '_' or '-'"
                ),
            ));
        }
        let class = class_name(name);
        if !CLASS_RE.is_match(&class) {
            return Err(ValidationError::new(
                ValidationErrorKind::InvalidName,
                "name",
                format!("'{name}' normalizes to '{class}', which is not a Ruby class name"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::empty_fields_builder;
    use proptest::prelude::*;

    fn check(name: &str) -> Result<(), ValidationError> {
        let descriptor = empty_fields_builder().name(name).build().unwrap();
        NameRule.check(&descriptor, &Policy::default())
    }

    #[test]
    fn accepts_homebrew_style_names() {
        for name in ["jq", "python@3.12", "gtk+3", "test-generate-formula-empty-fields"] {
            assert!(check(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn whitespace_only_name_is_empty() {
        assert_eq!(check("   ").unwrap_err().kind, ValidationErrorKind::EmptyName);
    }

    #[test]
    fn rejects_leading_digit_and_spaces() {
        assert_eq!(check("1tool").unwrap_err().kind, ValidationErrorKind::InvalidName);
        assert_eq!(check("my tool").unwrap_err().kind, ValidationErrorKind::InvalidName);
    }

    #[test]
    fn rejects_names_without_a_valid_class_name() {
        for name in ["tool-", "a@b", "a..b", "a@1@2"] {
            let err = check(name).unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidName, "{name}");
            assert_eq!(err.field, "name");
        }
    }

    proptest! {
        #[test]
        fn separated_names_normalize_to_constants(
            name in "[a-z][a-z0-9]{0,8}([-_.+][a-z0-9]{1,8}){0,3}(@[0-9]{1,2})?"
        ) {
            prop_assert!(check(&name).is_ok());
            prop_assert!(CLASS_RE.is_match(&class_name(&name)), "{}", class_name(&name));
        }

        #[test]
        fn accepted_names_always_render_as_constants(name in "[A-Za-z][A-Za-z0-9+@._-]{0,12}") {
            if check(&name).is_ok() {
                prop_assert!(CLASS_RE.is_match(&class_name(&name)));
            }
        }
    }
}
