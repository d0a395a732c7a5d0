//! Database configuration via `tcestore.toml`
//!
//! On first open, a default `tcestore.toml` is created in the data directory.
//! To change settings, edit the file and reopen the store.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tcestore_core::{FingerprintStrategy, StoreError, StoreResult};

use super::LOCK_FILE_NAME;

/// Config file name placed in the data directory.
pub const CONFIG_FILE_NAME: &str = "tcestore.toml";

/// Store configuration loaded from `tcestore.toml`.
///
/// # Example
///
/// ```toml
/// snapshots_dir = "tce"
/// index_file = "index.sqlite"
/// fingerprint = "sha256"
/// sync_writes = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TceStoreConfig {
    /// Snapshot root, relative to the data directory.
    #[serde(default = "default_snapshots_dir")]
    pub snapshots_dir: String,
    /// SQLite index file, relative to the data directory.
    #[serde(default = "default_index_file")]
    pub index_file: String,
    /// Fingerprint strategy: `"sha256"` or `"exact"`.
    #[serde(default = "default_fingerprint")]
    pub fingerprint: String,
    /// Fsync snapshot files before renaming them into place.
    #[serde(default = "default_sync_writes")]
    pub sync_writes: bool,
}

fn default_snapshots_dir() -> String {
    "tce".to_string()
}

fn default_index_file() -> String {
    "index.sqlite".to_string()
}

fn default_fingerprint() -> String {
    FingerprintStrategy::default().as_str().to_string()
}

fn default_sync_writes() -> bool {
    true
}

impl Default for TceStoreConfig {
    fn default() -> Self {
        Self {
            snapshots_dir: default_snapshots_dir(),
            index_file: default_index_file(),
            fingerprint: default_fingerprint(),
            sync_writes: default_sync_writes(),
        }
    }
}

impl TceStoreConfig {
    /// Parse the fingerprint string into a [`FingerprintStrategy`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the string is not `"sha256"` or `"exact"`.
    pub fn fingerprint_strategy(&self) -> StoreResult<FingerprintStrategy> {
        self.fingerprint.parse().map_err(|_| {
            StoreError::validation(format!(
                "Invalid fingerprint '{}' in {}. Expected \"sha256\" or \"exact\".",
                self.fingerprint, CONFIG_FILE_NAME
            ))
        })
    }

    /// Check every field.
    ///
    /// Paths must be non-empty, relative, and stay inside the data directory.
    pub fn validate(&self) -> StoreResult<()> {
        let snapshots = check_relative("snapshots_dir", &self.snapshots_dir)?;
        let index = check_relative("index_file", &self.index_file)?;
        if index.starts_with(&snapshots) || snapshots.starts_with(&index) {
            return Err(StoreError::validation(format!(
                "index_file = '{}' in {} must not overlap snapshots_dir = '{}'",
                self.index_file, CONFIG_FILE_NAME, self.snapshots_dir
            )));
        }
        self.fingerprint_strategy()?;
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# tcestore configuration
#
# Directory holding one sub-directory of numbered snapshots per record,
# relative to the data directory.
snapshots_dir = "tce"

# SQLite file mirroring the latest snapshot of every record.
index_file = "index.sqlite"

# How submissions are compared with the latest snapshot:
#   "sha256" = SHA-256 digest of the canonical JSON (default)
#   "exact"  = the canonical JSON string itself
fingerprint = "sha256"

# Fsync each snapshot before it becomes visible (default: true).
sync_writes = true
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StoreError::storage(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: TceStoreConfig = toml::from_str(&content).map_err(|e| {
            StoreError::serialization(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> StoreResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StoreError::storage(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StoreResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            StoreError::serialization(format!("Failed to serialize config: {}", e))
        })?;
        std::fs::write(path, content).map_err(|e| {
            StoreError::storage(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

/// Normalize a configured path, keeping only its named components.
fn check_relative(field: &str, value: &str) -> StoreResult<PathBuf> {
    let invalid = |why: &str| {
        StoreError::validation(format!(
            "{} = '{}' in {} {}",
            field, value, CONFIG_FILE_NAME, why
        ))
    };

    let mut normalized = PathBuf::new();
    for component in Path::new(value).components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            _ => return Err(invalid("must be a relative path inside the data directory")),
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(invalid("must name a path below the data directory"));
    }
    if normalized == Path::new(CONFIG_FILE_NAME) || normalized == Path::new(LOCK_FILE_NAME) {
        return Err(invalid("collides with a reserved file"));
    }
    Ok(normalized)
}
