//! Fixture discovery.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::FIXTURE_EXTENSION;
use crate::error::DiscoveryError;

/// Lists the `.jet` files directly inside `dir`, sorted by file name.
/// Hidden files (names starting with `.`) are not fixtures.
///
/// Subdirectories are not traversed. A missing or unreadable directory is a
/// [`DiscoveryError`]; an existing directory without fixtures yields an empty list.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    // Reject non-directories up front; walkdir would happily yield a lone file.
    let meta = fs::metadata(dir).map_err(|source| DiscoveryError {
        dir: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(DiscoveryError {
            dir: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        });
    }

    let mut found = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|err| DiscoveryError {
            dir: dir.to_path_buf(),
            source: err.into(),
        })?;
        if is_hidden(entry.file_name()) {
            continue;
        }
        if !entry.file_type().is_file() && !is_symlink_to_file(entry.path()) {
            continue;
        }
        if entry.path().extension().and_then(|s| s.to_str()) != Some(FIXTURE_EXTENSION) {
            continue;
        }
        debug!(fixture = %entry.path().display(), "discovered fixture");
        found.push(entry.into_path());
    }
    Ok(found)
}

fn is_hidden(name: &OsStr) -> bool {
    name.as_encoded_bytes().starts_with(b".")
}

fn is_symlink_to_file(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}
