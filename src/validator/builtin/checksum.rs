use crate::descriptor::{Checksum, PackageDescriptor};
use crate::validator::{Policy, Rule, RuleMetadata, ValidationError, ValidationErrorKind};

pub(super) fn check_checksum(
    checksum: &Checksum,
    field: &str,
    policy: &Policy,
) -> Result<(), ValidationError> {
    if !checksum.is_well_formed() {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidChecksum,
            field,
            format!(
                "expected {} lowercase hex characters for {}, got {:?}",
                checksum.algorithm.hex_len(),
                checksum.algorithm,
                checksum.as_str()
            ),
        ));
    }
    if checksum.is_unverified() && policy.reject_unverified {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidChecksum,
            field,
            "unverified all-zero checksum is rejected by policy",
        ));
    }
    Ok(())
}

/// FORMULA-004: archive checksum
pub struct ChecksumRule;

impl Rule for ChecksumRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-004".into(),
            name: "Archive checksum".into(),
            description: "Checksum has the digest's length and lowercase hex alphabet".into(),
            kinds: vec![ValidationErrorKind::InvalidChecksum],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        policy: &Policy,
    ) -> Result<(), ValidationError> {
        check_checksum(descriptor.checksum(), "checksum", policy)
    }
}
