//! Query Fingerprinting Module
//!
//! Maps query text to the fixed-length identifier used as the cache key.
//!
//! Fingerprints are the lowercase hex encoding of the SHA-256 of the raw
//! query bytes. The text is hashed byte-for-byte: no whitespace or case
//! normalization, so two textually different but semantically equivalent
//! queries are distinct cache keys.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length in characters of the hex-encoded fingerprint.
pub const FINGERPRINT_LEN: usize = 64;

// == Fingerprint ==
/// Fixed-length deterministic identifier derived from query text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    // == Constructor ==
    /// Computes the fingerprint of the given query text.
    pub fn of(query_text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query_text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps an already-computed identifier, e.g. one read back from the
    /// persistent store.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// Returns the hex-encoded identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_deterministic() {
        let a = Fingerprint::of("SELECT * FROM users");
        let b = Fingerprint::of("SELECT * FROM users");
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_distinct_queries() {
        let a = Fingerprint::of("SELECT * FROM users");
        let b = Fingerprint::of("SELECT * FROM orders");
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_fixed_length() {
        assert_eq!(Fingerprint::of("").as_str().len(), FINGERPRINT_LEN);
        assert_eq!(Fingerprint::of("x").as_str().len(), FINGERPRINT_LEN);
        let long = "SELECT ".repeat(10_000);
        assert_eq!(Fingerprint::of(&long).as_str().len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_no_normalization() {
        // Whitespace differences are significant.
        let a = Fingerprint::of("SELECT 1");
        let b = Fingerprint::of("SELECT  1");
        assert_ne!(a, b);

        // Case differences are significant.
        let c = Fingerprint::of("select 1");
        assert_ne!(a, c);
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        let fp = Fingerprint::of("SELECT 1");
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(fp.as_str(), fp.as_str().to_lowercase());
    }

    #[test]
    fn test_fingerprint_display_matches_as_str() {
        let fp = Fingerprint::of("SELECT 1");
        assert_eq!(fp.to_string(), fp.as_str());
    }
}
