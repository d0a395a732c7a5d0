//! Crash-safe file replacement
//!
//! Writes go to `<path>.tmp`, are optionally fsynced, then renamed over the
//! final path. Readers never observe a partially written snapshot; a crash
//! can at worst leave a `.tmp` file behind, which listings ignore.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tcestore_core::snapshot::TEMP_SUFFIX;

/// Temp path used while writing `path`.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}

/// Write `bytes` to `path` using write-fsync-rename.
///
/// When `sync` is false the fsync of the file and of its parent directory is
/// skipped; the rename still keeps readers from seeing partial content.
pub fn write_atomic(path: &Path, bytes: &[u8], sync: bool) -> io::Result<()> {
    let temp_path = temp_path_for(path);

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&temp_path)?;
    if let Err(e) = file.write_all(bytes).and_then(|_| {
        if sync {
            file.sync_all()
        } else {
            Ok(())
        }
    }) {
        drop(file);
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    drop(file);

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if sync {
        sync_parent(path)?;
    }
    Ok(())
}

#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if parent.exists() {
            fs::File::open(parent)?.sync_all()?;
        }
    }
    Ok(())
}

// Directories cannot be opened for syncing on Windows.
#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> io::Result<()> {
    Ok(())
}
