use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Atomically writes `content` to `path` using write-to-temp-then-rename.
///
/// The destination is never left holding a partially rendered feed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    // SEC-009: Randomized temp filename to prevent TOCTOU race conditions
    let random_suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let temp_path = path.with_extension(format!("tmp.{:016x}", random_suffix));

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true) // Fails atomically if file exists (prevents symlink race)
        .open(&temp_path)
        .with_context(|| {
            format!(
                "Failed to create temporary file '{}': check directory permissions",
                temp_path.display()
            )
        })?;

    file.write_all(content).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to write feed to temporary file '{}'",
            temp_path.display()
        )
    })?;

    file.sync_all().with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to sync temporary file '{}' to disk",
            temp_path.display()
        )
    })?;

    drop(file);

    // On Windows, rename fails if destination exists, so remove it first
    #[cfg(windows)]
    if path.exists() {
        std::fs::remove_file(path).with_context(|| {
            let _ = std::fs::remove_file(&temp_path);
            format!(
                "Failed to remove existing '{}' before atomic replace",
                path.display()
            )
        })?;
    }

    std::fs::rename(&temp_path, path).with_context(|| {
        let _ = std::fs::remove_file(&temp_path);
        format!(
            "Failed to rename '{}' to '{}'",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
