//! Filesystem locations owned by quotapanel.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Get the base state directory, preferring XDG_RUNTIME_DIR for security
pub fn state_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(xdg).join("quotapanel")
    } else {
        let uid = unsafe { libc::getuid() };
        PathBuf::from(format!("/tmp/quotapanel-{}", uid))
    }
}

/// File the announcement store records the last shown id in
pub fn announcement_state_path() -> PathBuf {
    state_dir().join("announcement.json")
}

/// Log file written by the terminal front-end (stdout belongs to the TUI)
pub fn log_path() -> PathBuf {
    state_dir().join("quotapanel.log")
}

/// Create the state directory if needed and make it private (0o700)
pub fn ensure_state_dir() -> Result<PathBuf> {
    let dir = state_dir();
    ensure_private_dir(&dir)?;
    Ok(dir)
}

/// Ensure `dir` exists, is a real directory and has mode 0o700
fn ensure_private_dir(dir: &Path) -> Result<()> {
    // Check for symlink attack before creating
    if let Ok(meta) = std::fs::symlink_metadata(dir) {
        if meta.file_type().is_symlink() {
            anyhow::bail!(
                "State directory is a symlink (possible attack): {}",
                dir.display()
            );
        }
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
    let metadata = std::fs::metadata(dir)
        .with_context(|| format!("Failed to read metadata for: {}", dir.display()))?;
    if !metadata.is_dir() {
        anyhow::bail!("State path is not a directory: {}", dir.display());
    }
    let mode = metadata.permissions().mode() & 0o777;
    if mode != 0o700 {
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))
            .with_context(|| format!("Failed to set permissions on: {}", dir.display()))?;
    }
    Ok(())
}
