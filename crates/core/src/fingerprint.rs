//! Content fingerprints
//!
//! A fingerprint decides whether a submitted document is the same content as
//! the latest stored snapshot. Two strategies are available:
//!
//! - [`FingerprintStrategy::Exact`]: the compact serialization itself
//! - [`FingerprintStrategy::Sha256`]: SHA-256 over the compact serialization
//!
//! Both operate on the canonical (key-sorted) serialization produced by
//! [`Document::to_compact_string`], so documents that differ only in object
//! key order fingerprint identically.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::document::Document;
use crate::error::StoreError;

/// How documents are fingerprinted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintStrategy {
    /// Compare serialized strings directly
    Exact,
    /// Compare SHA-256 digests of the serialized strings
    #[default]
    Sha256,
}

impl FingerprintStrategy {
    /// Fingerprint a document with this strategy.
    pub fn fingerprint(&self, document: &Document) -> Fingerprint {
        let canonical = document.to_compact_string();
        match self {
            FingerprintStrategy::Exact => Fingerprint::Exact(canonical),
            FingerprintStrategy::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(canonical.as_bytes());
                Fingerprint::Sha256(hasher.finalize().into())
            }
        }
    }

    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintStrategy::Exact => "exact",
            FingerprintStrategy::Sha256 => "sha256",
        }
    }
}

impl FromStr for FingerprintStrategy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(FingerprintStrategy::Exact),
            "sha256" => Ok(FingerprintStrategy::Sha256),
            other => Err(StoreError::validation(format!(
                "invalid fingerprint strategy '{}'. Expected \"exact\" or \"sha256\".",
                other
            ))),
        }
    }
}

impl fmt::Display for FingerprintStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a document's content.
///
/// Fingerprints produced by different strategies never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    /// Canonical compact serialization
    Exact(String),
    /// SHA-256 digest of the canonical compact serialization
    Sha256([u8; 32]),
}

impl Fingerprint {
    /// Short printable form for logs: the hex digest, or the byte length of
    /// an exact fingerprint.
    pub fn short(&self) -> String {
        match self {
            Fingerprint::Exact(s) => format!("exact:{}b", s.len()),
            Fingerprint::Sha256(digest) => digest[..8].iter().map(|b| format!("{b:02x}")).collect(),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fingerprint::Exact(s) => f.write_str(s),
            Fingerprint::Sha256(digest) => {
                for b in digest {
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Fingerprint with the default strategy (SHA-256).
pub fn fingerprint(document: &Document) -> Fingerprint {
    FingerprintStrategy::default().fingerprint(document)
}
