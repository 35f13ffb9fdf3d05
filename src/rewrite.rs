//! Writing reformatted content back in place.
//!
//! The new content goes to a uniquely named temporary sibling of the real
//! file, is synced to disk, then renamed over the original. A failure before
//! the rename leaves the original untouched. Symlinks are resolved first so
//! the link itself survives and its target gets the new content.
//!
//! The temporary file is owned by a [`TempPath`] guard until the rename, so
//! it is removed on every early return and when the writing task is dropped
//! mid-flight.

use std::fs::Permissions;
use std::path::Path;

use tempfile::TempPath;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::RewriteError;

/// Suffix of the temporary files created next to rewritten sources.
const TEMP_SUFFIX: &str = ".blackd-client.tmp";

/// Replaces the content of `path` with `content`.
///
/// Concurrent calls for the same file (for example through a symlink and
/// its target) each use their own temporary file; the last rename wins.
pub async fn overwrite(path: &Path, content: &[u8]) -> Result<(), RewriteError> {
    let create = |source| RewriteError::Create {
        path: path.to_path_buf(),
        source,
    };
    let target = fs::canonicalize(path).await.map_err(create)?;
    let permissions = fs::metadata(&target).await.map_err(create)?.permissions();

    let (file, temp) = temp_sibling(&target).map_err(create)?;
    write_synced(path, fs::File::from_std(file), content, permissions).await?;

    temp.persist(&target).map_err(|e| RewriteError::Rename {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    tracing::debug!("wrote {} bytes to {}", content.len(), target.display());
    Ok(())
}

/// Creates a hidden, uniquely named file next to `target`.
fn temp_sibling(target: &Path) -> std::io::Result<(std::fs::File, TempPath)> {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = target.parent().unwrap_or(Path::new("."));
    let named = tempfile::Builder::new()
        .prefix(&format!(".{name}."))
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)?;
    Ok(named.into_parts())
}

async fn write_synced(
    path: &Path,
    mut file: fs::File,
    content: &[u8],
    permissions: Permissions,
) -> Result<(), RewriteError> {
    file.set_permissions(permissions)
        .await
        .map_err(|source| RewriteError::Create {
            path: path.to_path_buf(),
            source,
        })?;

    let write = |source| RewriteError::Write {
        path: path.to_path_buf(),
        source,
    };
    file.write_all(content).await.map_err(write)?;
    file.flush().await.map_err(write)?;

    file.sync_all().await.map_err(|source| RewriteError::Sync {
        path: path.to_path_buf(),
        source,
    })
}
