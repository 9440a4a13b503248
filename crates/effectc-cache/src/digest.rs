//! Content digests for change detection.
//!
//! Every input that influences a generated output is fingerprinted with
//! SHA-256. A file that cannot be read digests to an explicit *missing*
//! sentinel rather than the digest of zero bytes, so that a vanished template
//! or core library always registers as a change and never as a cache hit.

use std::{fmt, path::Path};

use sha2::{Digest as _, Sha256};

/// A hex-encoded SHA-256 content digest, or the missing-file sentinel.
///
/// The sentinel is the empty string. It round-trips through serde like any
/// other value but never [`matches`](Digest::matches) anything, itself
/// included.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    /// Digests the given bytes.
    #[must_use]
    pub fn of_bytes(bytes: impl AsRef<[u8]>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes.as_ref());
        let hash = hasher.finalize();
        let mut hex = String::with_capacity(hash.len() * 2);
        for byte in hash {
            use fmt::Write as _;
            // writing to a String cannot fail
            let _ = write!(hex, "{byte:02x}");
        }
        Self(hex)
    }

    /// Reads the file at `path` and digests its bytes.
    ///
    /// Returns the [missing sentinel](Digest::missing) if the file does not
    /// exist or cannot be read.
    #[must_use]
    pub fn of_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read(path) {
            Ok(bytes) => Self::of_bytes(bytes),
            Err(source) => {
                log::debug!("could not read '{}' for digesting: {source}", path.display());
                Self::missing()
            }
        }
    }

    /// Returns the sentinel standing in for an unreadable or absent file.
    #[must_use]
    pub const fn missing() -> Self {
        Self(String::new())
    }

    /// Returns `true` if self is the missing-file sentinel.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if both digests are real and equal.
    ///
    /// A missing sentinel matches nothing, not even another sentinel. This is
    /// the comparison the staleness predicate uses, so a missing input can
    /// only ever force a rebuild.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        !self.is_missing() && !other.is_missing() && self.0 == other.0
    }
}

impl fmt::Display for Digest {
    #[inline]
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            formatter.write_str("<missing>")
        } else {
            formatter.write_str(&self.0)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn digest_is_deterministic() {
        let first = Digest::of_bytes(b"float4 EffectMain() { return 0; }");
        let second = Digest::of_bytes(b"float4 EffectMain() { return 0; }");
        assert_eq!(first, second);
        assert!(first.matches(&second));
    }

    #[test_log::test]
    fn digest_differs_for_different_content() {
        let first = Digest::of_bytes(b"return 0;");
        let second = Digest::of_bytes(b"return 1;");
        assert!(!first.matches(&second));
    }

    #[test_log::test]
    fn file_digest_equals_bytes_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.effect");
        std::fs::write(&path, "_Speed (\"Speed\", Float) = 2.5").unwrap();

        let from_file = Digest::of_file(&path);
        let from_bytes = Digest::of_bytes("_Speed (\"Speed\", Float) = 2.5");
        assert!(from_file.matches(&from_bytes));
    }

    #[test_log::test]
    fn missing_file_digests_to_sentinel() {
        let digest = Digest::of_file("/definitely/not/here.effect");
        assert!(digest.is_missing());
    }

    #[test_log::test]
    fn sentinel_is_not_the_empty_digest() {
        // A truncated-to-empty file is still a real digest and must not be
        // confused with an unreadable one.
        let empty = Digest::of_bytes(b"");
        assert!(!empty.is_missing());
        assert!(!empty.matches(&Digest::missing()));
    }

    #[test_log::test]
    fn sentinel_matches_nothing_including_itself() {
        assert!(!Digest::missing().matches(&Digest::missing()));
        assert!(!Digest::missing().matches(&Digest::of_bytes(b"x")));
    }

    #[test_log::test]
    fn serde_roundtrip() {
        let digest = Digest::of_bytes(b"roundtrip");
        let json = serde_json::to_string(&digest).unwrap();
        let back: Digest = serde_json::from_str(&json).unwrap();
        assert!(digest.matches(&back));
    }
}
