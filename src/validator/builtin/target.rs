use std::collections::HashSet;

use super::checksum::check_checksum;
use super::urls::check_url;
use crate::descriptor::PackageDescriptor;
use crate::validator::{Policy, Rule, RuleMetadata, ValidationError, ValidationErrorKind};

/// FORMULA-007: platform archives
///
/// Each target gets the same URL and checksum checks as the default
/// archive, and a platform may only be listed once.
pub struct TargetRule;

impl Rule for TargetRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-007".into(),
            name: "Platform archives".into(),
            description: "Per-platform archives have valid URLs, checksums and no duplicates"
                .into(),
            kinds: vec![
                ValidationErrorKind::InvalidUrl,
                ValidationErrorKind::InvalidChecksum,
                ValidationErrorKind::DuplicateTarget,
            ],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        policy: &Policy,
    ) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for (i, target) in descriptor.targets().iter().enumerate() {
            if !seen.insert(target.platform) {
                return Err(ValidationError::new(
                    ValidationErrorKind::DuplicateTarget,
                    format!("targets[{i}].platform"),
                    format!("platform {} is listed more than once", target.platform),
                ));
            }
            check_url(&target.url, &format!("targets[{i}].url"))?;
            check_checksum(&target.checksum, &format!("targets[{i}].checksum"), policy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::fixtures::empty_fields_builder;
    use crate::descriptor::{Checksum, Platform, PlatformArchive};

    fn archive(platform: Platform, url: &str, hex: &str) -> PlatformArchive {
        PlatformArchive {
            platform,
            url: url.into(),
            checksum: Checksum::sha256(hex),
        }
    }

    #[test]
    fn duplicate_platform_is_rejected() {
        let hex = "a".repeat(64);
        let descriptor = empty_fields_builder()
            .target(archive(Platform::LinuxAmd64, "https://e.com/a.tar.gz", &hex))
            .target(archive(Platform::LinuxAmd64, "https://e.com/b.tar.gz", &hex))
            .build()
            .unwrap();
        let err = TargetRule.check(&descriptor, &Policy::default()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::DuplicateTarget);
    }

    #[test]
    fn target_checksum_is_checked() {
        let descriptor = empty_fields_builder()
            .target(archive(Platform::DarwinArm64, "https://e.com/a.tar.gz", "nope"))
            .build()
            .unwrap();
        let err = TargetRule.check(&descriptor, &Policy::default()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidChecksum);
        assert_eq!(err.field, "targets[0].checksum");
    }

    #[test]
    fn target_url_is_checked() {
        let descriptor = empty_fields_builder()
            .target(archive(Platform::DarwinArm64, "a.tar.gz", &"b".repeat(64)))
            .build()
            .unwrap();
        let err = TargetRule.check(&descriptor, &Policy::default()).unwrap_err();
        assert_eq!(err.kind, ValidationErrorKind::InvalidUrl);
    }
}
