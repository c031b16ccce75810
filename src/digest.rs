//! Archive digests and `checksum.txt` entries.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::descriptor::{Checksum, DigestAlgorithm};
use crate::error::Result;

/// Name of the checksum manifest uploaded next to release archives.
pub const CHECKSUM_FILE: &str = "checksum.txt";

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Computes hex digests of archive contents.
pub trait DigestComputer: Send + Sync {
    fn algorithm(&self) -> DigestAlgorithm;

    /// Hex digest of an in-memory byte slice.
    fn digest(&self, bytes: &[u8]) -> String;

    /// Hex digest of everything a reader yields.
    fn digest_reader(&self, reader: &mut dyn Read) -> std::io::Result<String>;

    /// Checksum of a file on disk.
    fn digest_file(&self, path: &Path) -> Result<Checksum> {
        let mut reader = BufReader::new(File::open(path)?);
        let hex = self.digest_reader(&mut reader)?;
        tracing::debug!(path = %path.display(), checksum = %hex, "archive digested");
        Ok(Checksum::new(self.algorithm(), hex))
    }
}

/// SHA-256, the digest Homebrew formulas declare.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl DigestComputer for Sha256Digest {
    fn algorithm(&self) -> DigestAlgorithm {
        DigestAlgorithm::Sha256
    }

    fn digest(&self, bytes: &[u8]) -> String {
        hex::encode(Sha256::digest(bytes))
    }

    fn digest_reader(&self, reader: &mut dyn Read) -> std::io::Result<String> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

/// The digest computer for an algorithm.
pub fn computer_for(algorithm: DigestAlgorithm) -> Box<dyn DigestComputer> {
    match algorithm {
        DigestAlgorithm::Sha256 => Box::new(Sha256Digest),
    }
}

/// One line of `checksum.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumEntry {
    pub checksum: Checksum,
    pub filename: String,
}

impl ChecksumEntry {
    /// Digest `path` and name the entry after its file name.
    pub fn from_file(computer: &dyn DigestComputer, path: &Path) -> Result<Self> {
        let checksum = computer.digest_file(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { checksum, filename })
    }
}

/// Render `checksum.txt`: one `<hex> <filename>` line per entry, in order.
pub fn render_checksum_file(entries: &[ChecksumEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} {}\n", e.checksum, e.filename))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn sha256_known_vectors() {
        assert_eq!(Sha256Digest.digest(b""), EMPTY_SHA256);
        assert_eq!(Sha256Digest.digest(b"abc"), ABC_SHA256);
    }

    #[test]
    fn reader_digest_matches_slice_digest() {
        let data = vec![7u8; READ_BUFFER_SIZE * 2 + 13];
        let mut reader = std::io::Cursor::new(data.clone());
        assert_eq!(
            Sha256Digest.digest_reader(&mut reader).unwrap(),
            Sha256Digest.digest(&data)
        );
    }

    #[test]
    fn file_digest_is_well_formed_checksum() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"abc").unwrap();
        let checksum = Sha256Digest.digest_file(file.path()).unwrap();
        assert_eq!(checksum.as_str(), ABC_SHA256);
        assert!(checksum.is_well_formed());
        assert!(!checksum.is_unverified());
    }

    #[test]
    fn checksum_file_lists_entries_in_order() {
        let entries = vec![
            ChecksumEntry {
                checksum: Checksum::sha256(ABC_SHA256),
                filename: "v0.1.0.tar.gz".into(),
            },
            ChecksumEntry {
                checksum: Checksum::sha256(EMPTY_SHA256),
                filename: "tool-0.1.0-linux-amd64.tar.gz".into(),
            },
        ];
        let text = render_checksum_file(&entries);
        assert_eq!(
            text,
            format!("{ABC_SHA256} v0.1.0.tar.gz\n{EMPTY_SHA256} tool-0.1.0-linux-amd64.tar.gz\n")
        );
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Sha256Digest
            .digest_file(Path::new("/definitely/not/here.tar.gz"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
