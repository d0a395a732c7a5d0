//! Access control and open options for tcestore.
//!
//! This crate provides:
//! - [`AccessMode`] and [`OpenOptions`], controlling how a store is opened
//! - [`Authorizer`], the capability that gates deleting a record's history
//!
//! Delete credentials are never compiled in. [`SharedSecret`] compares
//! against a secret supplied at runtime (typically from
//! [`DELETE_SECRET_ENV`]); without one, [`DenyAll`] rejects every delete.

#![warn(missing_docs)]

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::warn;

/// Environment variable holding the delete secret.
pub const DELETE_SECRET_ENV: &str = "TCESTORE_DELETE_SECRET";

/// Controls whether the store allows writes or is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccessMode {
    /// Allow both reads and writes (default).
    #[default]
    ReadWrite,
    /// Read-only mode. Submit, delete and repair return an error.
    ReadOnly,
}

/// Options for opening a store.
///
/// Any field set to `Some` overrides the corresponding value in
/// `tcestore.toml`.
///
/// ```ignore
/// use tcestore_security::{AccessMode, OpenOptions};
///
/// let opts = OpenOptions::new()
///     .access_mode(AccessMode::ReadOnly)
///     .fingerprint("exact");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// The access mode for the store.
    pub access_mode: AccessMode,
    /// Override fingerprint strategy: `"sha256"` or `"exact"`.
    pub fingerprint: Option<String>,
    /// Override fsync of snapshot writes.
    pub sync_writes: Option<bool>,
}

impl OpenOptions {
    /// Create a new `OpenOptions` with default settings (read-write mode).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access mode for the store.
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Set the fingerprint strategy (`"sha256"` or `"exact"`).
    pub fn fingerprint(mut self, strategy: &str) -> Self {
        self.fingerprint = Some(strategy.to_string());
        self
    }

    /// Enable or disable fsync of snapshot writes.
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.sync_writes = Some(enabled);
        self
    }
}

// ============================================================================
// Delete authorization
// ============================================================================

/// Decides whether a caller may delete a record's history.
pub trait Authorizer: Send + Sync {
    /// Returns true if `credential` allows deleting `key`.
    fn authorize_delete(&self, key: &str, credential: Option<&str>) -> bool;
}

/// Rejects every delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn authorize_delete(&self, _key: &str, _credential: Option<&str>) -> bool {
        false
    }
}

/// Accepts every delete. For embedding in trusted processes and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize_delete(&self, _key: &str, _credential: Option<&str>) -> bool {
        true
    }
}

/// Accepts deletes whose credential equals a runtime-supplied secret.
#[derive(Clone)]
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    /// Wrap a secret. Empty secrets are refused.
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return None;
        }
        Some(Self { secret })
    }

    /// Read the secret from an environment variable.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().and_then(Self::new)
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Authorizer for SharedSecret {
    fn authorize_delete(&self, _key: &str, credential: Option<&str>) -> bool {
        match credential {
            Some(given) => bool::from(given.as_bytes().ct_eq(self.secret.as_bytes())),
            None => false,
        }
    }
}

/// Build the delete authorizer from [`DELETE_SECRET_ENV`].
///
/// Falls back to [`DenyAll`] (with a warning) when the variable is unset or
/// empty.
pub fn authorizer_from_env() -> Arc<dyn Authorizer> {
    match SharedSecret::from_env(DELETE_SECRET_ENV) {
        Some(secret) => Arc::new(secret),
        None => {
            warn!(
                target: "tcestore::security",
                var = DELETE_SECRET_ENV,
                "No delete secret configured; all deletes will be rejected"
            );
            Arc::new(DenyAll)
        }
    }
}
