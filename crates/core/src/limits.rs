//! Size limits for record keys and documents
//!
//! Record keys double as directory names, so their limit is far below
//! filesystem name limits. Documents are bounded by their compact JSON size.

/// Maximum record key length in bytes.
pub const MAX_KEY_BYTES: usize = 128;

/// Maximum compact-serialized document size in bytes (16MB).
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Size limits enforced on submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum record key length in bytes (default: 128)
    pub max_key_bytes: usize,

    /// Maximum document size in bytes (default: 16MB)
    pub max_document_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_key_bytes: MAX_KEY_BYTES,
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_key_bytes, 128);
        assert_eq!(limits.max_document_bytes, 16 * 1024 * 1024);
    }
}
