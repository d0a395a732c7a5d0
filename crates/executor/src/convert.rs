//! Error conversion from internal error types.

use crate::Error;
use tcestore_core::StoreError;

/// Convert a StoreError to an executor Error.
///
/// Every detail is carried over; only the I/O source is flattened to text.
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(reason) => Error::InvalidInput { reason },
            StoreError::NotFound { key, version: None } => Error::RecordNotFound { key },
            StoreError::NotFound {
                key,
                version: Some(version),
            } => Error::VersionNotFound { key, version },
            StoreError::Unauthorized(reason) => Error::Unauthorized { reason },
            StoreError::ShuttingDown => Error::ShuttingDown,
            StoreError::Io(e) => Error::Io {
                reason: e.to_string(),
            },
            StoreError::Storage(reason) => Error::Storage { reason },
            StoreError::Serialization(reason) => Error::Serialization { reason },
            StoreError::Index(reason) => Error::Index { reason },
            StoreError::PartialCommit {
                key,
                version,
                reason,
            } => Error::PartialCommit {
                key,
                version,
                reason,
            },
            StoreError::VersionConflict { key, version } => Error::VersionConflict { key, version },
        }
    }
}
