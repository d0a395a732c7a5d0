//! Process-wide registry of open stores
//!
//! Opening the same data directory twice returns the same [`Database`]
//! instance. Entries are weak references, so a store is released once every
//! handle is dropped.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Weak;

use super::Database;

/// Open stores keyed by canonical data directory.
pub static OPEN_DATABASES: Lazy<Mutex<HashMap<PathBuf, Weak<Database>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
