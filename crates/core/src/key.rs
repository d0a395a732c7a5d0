//! Record key validation
//!
//! A record key (`idUnico`) names one document's version history. It is used
//! verbatim as a directory name under the snapshot root and as the primary
//! key of the record index, so it must be a safe single path segment.
//!
//! ## Rules
//!
//! - Keys must not be empty
//! - Keys must not exceed `max_key_bytes` (default: 128)
//! - Keys must not start with `.` (rules out `.`, `..` and hidden entries)
//! - Keys may only contain ASCII letters, digits, `-`, `_` and `.`

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{StoreError, StoreResult};
use crate::limits::Limits;

/// Document field that carries the record key.
pub const KEY_FIELD: &str = "idUnico";

/// Validate a key using default limits
///
/// # Examples
///
/// ```
/// use tcestore_core::key::validate_key;
///
/// assert!(validate_key("TCE-2025_001").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key("../etc").is_err());
/// assert!(validate_key("a/b").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), KeyError> {
    validate_key_with_limits(key, &Limits::default())
}

/// Validate a key with custom limits
pub fn validate_key_with_limits(key: &str, limits: &Limits) -> Result<(), KeyError> {
    if key.is_empty() {
        return Err(KeyError::Empty);
    }

    let len = key.len();
    if len > limits.max_key_bytes {
        return Err(KeyError::TooLong {
            actual: len,
            max: limits.max_key_bytes,
        });
    }

    if key.starts_with('.') {
        return Err(KeyError::LeadingDot);
    }

    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(KeyError::InvalidChar(c));
    }

    Ok(())
}

/// Key validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    /// Key is empty (length 0)
    #[error("record key cannot be empty")]
    Empty,

    /// Key exceeds maximum length
    #[error("record key too long: {actual} bytes exceeds maximum {max}")]
    TooLong {
        /// Actual key length in bytes
        actual: usize,
        /// Maximum allowed length
        max: usize,
    },

    /// Key starts with `.`
    #[error("record key cannot start with '.'")]
    LeadingDot,

    /// Key contains a character outside `[A-Za-z0-9._-]`
    #[error("record key contains invalid character {0:?}")]
    InvalidChar(char),
}

impl From<KeyError> for StoreError {
    fn from(e: KeyError) -> Self {
        StoreError::Validation(e.to_string())
    }
}

/// A validated record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordKey(String);

impl RecordKey {
    /// Validate and wrap a raw key.
    pub fn new(raw: impl Into<String>) -> StoreResult<Self> {
        let raw = raw.into();
        validate_key(&raw)?;
        Ok(RecordKey(raw))
    }

    /// Extract the key from a document's `idUnico` field.
    ///
    /// Strings are taken verbatim and integers are rendered in decimal.
    /// Anything that would be falsy (absent, null, `""`, `0`, `false`) or of
    /// another type is rejected.
    pub fn from_document(document: &Value) -> StoreResult<Self> {
        let missing = || {
            StoreError::validation(format!(
                "the document must contain a non-empty '{}' key",
                KEY_FIELD
            ))
        };
        match document.get(KEY_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => RecordKey::new(s.as_str()),
            Some(Value::Number(n)) => match (n.as_i64(), n.as_u64()) {
                (Some(0), _) => Err(missing()),
                (Some(i), _) => RecordKey::new(i.to_string()),
                (None, Some(u)) => RecordKey::new(u.to_string()),
                _ => Err(StoreError::validation(format!(
                    "'{}' must be a string or an integer",
                    KEY_FIELD
                ))),
            },
            _ => Err(missing()),
        }
    }

    /// Borrow the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RecordKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_key(&value)?;
        Ok(RecordKey(value))
    }
}

impl From<RecordKey> for String {
    fn from(key: RecordKey) -> Self {
        key.0
    }
}

impl AsRef<str> for RecordKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === Valid Keys ===

    #[test]
    fn test_valid_simple_key() {
        assert!(validate_key("A").is_ok());
        assert!(validate_key("123").is_ok());
    }

    #[test]
    fn test_valid_special_chars_key() {
        assert!(validate_key("tce-2025_01.v").is_ok());
    }

    #[test]
    fn test_valid_key_at_max_length() {
        let limits = Limits::default();
        let key = "x".repeat(limits.max_key_bytes);
        assert!(validate_key_with_limits(&key, &limits).is_ok());
    }

    // === Invalid Keys ===

    #[test]
    fn test_invalid_empty_key() {
        assert_eq!(validate_key(""), Err(KeyError::Empty));
    }

    #[test]
    fn test_invalid_key_too_long() {
        let key = "x".repeat(129);
        assert_eq!(
            validate_key(&key),
            Err(KeyError::TooLong {
                actual: 129,
                max: 128
            })
        );
    }

    #[test]
    fn test_invalid_path_traversal() {
        assert_eq!(validate_key(".."), Err(KeyError::LeadingDot));
        assert_eq!(validate_key("."), Err(KeyError::LeadingDot));
        assert_eq!(validate_key("../x"), Err(KeyError::LeadingDot));
        assert_eq!(validate_key("a/../b"), Err(KeyError::InvalidChar('/')));
        assert_eq!(validate_key("a\\b"), Err(KeyError::InvalidChar('\\')));
    }

    #[test]
    fn test_invalid_whitespace_and_nul() {
        assert_eq!(validate_key(" a"), Err(KeyError::InvalidChar(' ')));
        assert_eq!(validate_key("a\0"), Err(KeyError::InvalidChar('\0')));
    }

    #[test]
    fn test_invalid_non_ascii() {
        assert!(matches!(validate_key("estágio"), Err(KeyError::InvalidChar('á'))));
    }

    #[test]
    fn test_key_error_becomes_validation() {
        let err = StoreError::from(KeyError::LeadingDot);
        assert!(err.is_validation());
        assert_eq!(err.to_string(), format!("validation error: {}", KeyError::LeadingDot));
    }

    // === Extraction from documents ===

    #[test]
    fn test_from_document_string() {
        let key = RecordKey::from_document(&json!({"idUnico": "A", "name": "X"})).unwrap();
        assert_eq!(key.as_str(), "A");
    }

    #[test]
    fn test_from_document_integer() {
        let key = RecordKey::from_document(&json!({"idUnico": 123})).unwrap();
        assert_eq!(key.as_str(), "123");
    }

    #[test]
    fn test_from_document_falsy_values_rejected() {
        for doc in [
            json!({}),
            json!({"idUnico": null}),
            json!({"idUnico": ""}),
            json!({"idUnico": 0}),
            json!({"idUnico": false}),
            json!({"idUnico": 1.5}),
            json!({"idUnico": ["A"]}),
            json!("A"),
        ] {
            let err = RecordKey::from_document(&doc).unwrap_err();
            assert!(err.is_validation(), "expected validation error for {doc}");
        }
    }

    #[test]
    fn test_from_document_unsafe_key_rejected() {
        let err = RecordKey::from_document(&json!({"idUnico": "../../etc"})).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_serde_validates() {
        let ok: RecordKey = serde_json::from_str("\"A-1\"").unwrap();
        assert_eq!(ok.as_str(), "A-1");
        assert!(serde_json::from_str::<RecordKey>("\"a/b\"").is_err());
    }
}
