//! Filesystem helpers for the persisted selection
//!
//! - `atomic_write`: write to a sibling temp file, then rename over the target
//! - `atomic_rename`: rename that also replaces an existing target on Windows
//! - `default_state_path`: well-known location of the shared state file

use std::io;
use std::path::{Path, PathBuf};

/// File name of the shared state inside the temp directory
pub const STATE_FILE_NAME: &str = "mcp-pointer-shared-state.json";

/// Cross-platform atomic rename that handles Windows file replacement.
///
/// On Unix, `rename` atomically replaces the target if it exists.
/// On Windows, `rename` fails if the target exists, so the target is
/// removed first.
pub async fn atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if tokio::fs::try_exists(dst).await.unwrap_or(false) {
            tokio::fs::remove_file(dst).await?;
        }
    }
    tokio::fs::rename(src, dst).await
}

/// Replace `path` with `contents` so that readers see either the old or the
/// new bytes, never a partial file.
///
/// The temp file lives next to the target so the rename never crosses a
/// filesystem boundary. Missing parent directories are created.
pub async fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = temp_sibling(path);
    if let Err(e) = tokio::fs::write(&tmp, contents).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }

    if let Err(e) = atomic_rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }

    Ok(())
}

/// Unique temp path in the same directory as `path`
fn temp_sibling(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| STATE_FILE_NAME.to_string());
    let unique = uuid::Uuid::new_v4().simple().to_string();
    path.with_file_name(format!(".{}.{}.tmp", file_name, &unique[..12]))
}

/// Default location of the shared state file.
///
/// Every relay instance on the machine must agree on this path, so it lives in
/// the system temp directory rather than a per-user config location.
pub fn default_state_path() -> PathBuf {
    std::env::temp_dir().join(STATE_FILE_NAME)
}
