use serde::{Deserialize, Serialize};

/// Digest algorithms a formula can declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
}

impl DigestAlgorithm {
    /// Number of hex characters in a digest of this algorithm.
    pub fn hex_len(self) -> usize {
        match self {
            Self::Sha256 => 64,
        }
    }

    /// Keyword used for the checksum line in a formula.
    pub fn formula_key(self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
        }
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sha256 => write!(f, "sha256"),
        }
    }
}

/// An archive checksum as declared in a descriptor.
///
/// The value is stored as given; whether it is well formed is decided by
/// the validator, not at construction. An all-zero digest of the right
/// length is the "unverified" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    pub algorithm: DigestAlgorithm,
    pub hex: String,
}

impl Checksum {
    /// Config keyword that requests the unverified sentinel explicitly.
    pub const UNVERIFIED_KEYWORD: &'static str = "unverified";

    pub fn new(algorithm: DigestAlgorithm, hex: impl Into<String>) -> Self {
        Self {
            algorithm,
            hex: hex.into(),
        }
    }

    pub fn sha256(hex: impl Into<String>) -> Self {
        Self::new(DigestAlgorithm::Sha256, hex)
    }

    /// The all-zero sentinel for an archive whose digest was not computed.
    pub fn unverified(algorithm: DigestAlgorithm) -> Self {
        Self::new(algorithm, "0".repeat(algorithm.hex_len()))
    }

    /// Interpret a configured checksum value. `unverified` (any case) maps
    /// to the sentinel; anything else is kept verbatim apart from trimming.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case(Self::UNVERIFIED_KEYWORD) {
            Self::unverified(DigestAlgorithm::Sha256)
        } else {
            Self::sha256(value)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.hex
    }

    /// Correct length and only lowercase hex digits.
    pub fn is_well_formed(&self) -> bool {
        self.hex.len() == self.algorithm.hex_len()
            && self
                .hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    pub fn is_unverified(&self) -> bool {
        self.hex.len() == self.algorithm.hex_len() && self.hex.bytes().all(|b| b == b'0')
    }
}

impl std::fmt::Display for Checksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unverified_sentinel_is_well_formed() {
        let checksum = Checksum::unverified(DigestAlgorithm::Sha256);
        assert_eq!(checksum.as_str().len(), 64);
        assert!(checksum.is_well_formed());
        assert!(checksum.is_unverified());
    }

    #[test]
    fn parse_keyword_yields_sentinel() {
        assert!(Checksum::parse("Unverified").is_unverified());
        assert!(!Checksum::parse("abc").is_unverified());
    }

    #[test]
    fn uppercase_hex_is_not_well_formed() {
        let checksum = Checksum::sha256("A".repeat(64));
        assert!(!checksum.is_well_formed());
    }

    #[test]
    fn short_zero_string_is_not_the_sentinel() {
        let checksum = Checksum::sha256("0000");
        assert!(!checksum.is_unverified());
        assert!(!checksum.is_well_formed());
    }
}
