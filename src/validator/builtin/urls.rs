use url::Url;

use crate::descriptor::PackageDescriptor;
use crate::validator::{Policy, Rule, RuleMetadata, ValidationError, ValidationErrorKind};

/// Check that `value` is an absolute http(s) URL with a host.
pub(super) fn check_url(value: &str, field: &str) -> Result<(), ValidationError> {
    let invalid = |message: String| {
        Err(ValidationError::new(
            ValidationErrorKind::InvalidUrl,
            field,
            message,
        ))
    };

    if value.trim().is_empty() {
        return invalid("URL is empty".into());
    }
    // Url::parse silently strips surrounding whitespace; the formula would not.
    if value.trim() != value {
        return invalid(format!("'{value}' has leading or trailing whitespace"));
    }
    let parsed = match Url::parse(value) {
        Ok(parsed) => parsed,
        Err(e) => return invalid(format!("'{value}' is not an absolute URL: {e}")),
    };
    if !matches!(parsed.scheme(), "http" | "https") {
        return invalid(format!(
            "'{value}' uses scheme '{}', expected http or https",
            parsed.scheme()
        ));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return invalid(format!("'{value}' has no host"));
    }
    Ok(())
}

/// FORMULA-002: homepage URL
pub struct HomepageUrlRule;

impl Rule for HomepageUrlRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-002".into(),
            name: "Homepage URL".into(),
            description: "Homepage is an absolute http(s) URL".into(),
            kinds: vec![ValidationErrorKind::InvalidUrl],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        _policy: &Policy,
    ) -> Result<(), ValidationError> {
        check_url(descriptor.homepage_url(), "homepage_url")
    }
}

/// FORMULA-003: source archive URL
pub struct SourceUrlRule;

impl Rule for SourceUrlRule {
    fn metadata(&self) -> RuleMetadata {
        RuleMetadata {
            id: "FORMULA-003".into(),
            name: "Source URL".into(),
            description: "Source archive URL is an absolute http(s) URL".into(),
            kinds: vec![ValidationErrorKind::InvalidUrl],
        }
    }

    fn check(
        &self,
        descriptor: &PackageDescriptor,
        _policy: &Policy,
    ) -> Result<(), ValidationError> {
        check_url(descriptor.source_url(), "source_url")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_archive_urls() {
        assert!(check_url(
            "https://github.com/Justintime50/tool/archive/v0.1.0.tar.gz",
            "source_url"
        )
        .is_ok());
        assert!(check_url("http://example.com", "homepage_url").is_ok());
    }

    #[test]
    fn rejects_relative_and_non_http_urls() {
        for value in [
            "",
            "github.com/owner/repo",
            "/archive/v0.1.0.tar.gz",
            "ftp://example.com/a.tar.gz",
            "file:///tmp/a.tar.gz",
            " https://example.com",
        ] {
            let err = check_url(value, "source_url").unwrap_err();
            assert_eq!(err.kind, ValidationErrorKind::InvalidUrl, "{value:?}");
            assert_eq!(err.field, "source_url");
        }
    }
}
