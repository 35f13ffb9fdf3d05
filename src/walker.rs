//! Discovery of Python files under the source roots.
//!
//! Roots may be files or directories. Symlinks are followed. Unreadable
//! entries below a root are logged and skipped; a root that cannot be
//! read at all aborts the walk.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::WalkError;

/// File name suffix of candidate files.
pub const PYTHON_SUFFIX: &str = ".py";

/// Walks every root and hands each candidate path to `emit`.
///
/// `emit` returns `false` once the receiving side has gone away, which
/// stops the walk early. Returns the number of paths emitted.
pub fn walk_sources<F>(roots: &[PathBuf], mut emit: F) -> Result<usize, WalkError>
where
    F: FnMut(PathBuf) -> bool,
{
    let mut emitted = 0;
    for root in roots {
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(WalkError::Root {
                        path: root.clone(),
                        source: err,
                    });
                }
                Err(err) => {
                    let at = err.path().unwrap_or(root.as_path()).to_path_buf();
                    tracing::warn!("cannot format {}: {}", at.display(), err);
                    continue;
                }
            };
            if !is_candidate(&entry) {
                continue;
            }
            emitted += 1;
            if !emit(entry.into_path()) {
                tracing::debug!("path queue closed, stopping walk");
                return Ok(emitted);
            }
        }
    }
    Ok(emitted)
}

fn is_candidate(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_dir() {
        return false;
    }
    (file_type.is_file() || entry.path_is_symlink()) && has_python_suffix(entry.path())
}

fn has_python_suffix(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(PYTHON_SUFFIX))
        .unwrap_or(false)
}
