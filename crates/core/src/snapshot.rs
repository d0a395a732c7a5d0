//! Snapshot naming
//!
//! Snapshot `n` of a record lives in `<root>/<key>/<n>.json`, with `n`
//! zero-padded to at least [`VERSION_WIDTH`] digits (`001.json`,
//! `1000.json`). Versions start at 1.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Minimum number of digits in a snapshot file name.
pub const VERSION_WIDTH: usize = 3;

/// Snapshot file extension.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// Suffix of in-flight snapshot writes.
pub const TEMP_SUFFIX: &str = ".tmp";

/// File name for a snapshot version.
pub fn snapshot_file_name(version: u32) -> String {
    format!(
        "{:0width$}.{}",
        version,
        SNAPSHOT_EXTENSION,
        width = VERSION_WIDTH
    )
}

/// Parse a snapshot file name back into its version.
///
/// Returns `None` for anything that is not exactly the name
/// [`snapshot_file_name`] would produce for some version of at least 1, so
/// `1.json` and `0001.json` are rejected alongside non-numeric names.
pub fn parse_snapshot_file_name(name: &str) -> Option<u32> {
    let stem = name.strip_suffix(SNAPSHOT_EXTENSION)?.strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match stem.parse::<u32>() {
        Ok(v) if v > 0 && snapshot_file_name(v) == name => Some(v),
        _ => None,
    }
}

/// Returns true for leftovers of an interrupted atomic write.
pub fn is_temp_file_name(name: &str) -> bool {
    name.ends_with(TEMP_SUFFIX)
}

/// One stored version of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// 1-based version number
    pub version: u32,
    /// Document content
    pub document: Document,
}
