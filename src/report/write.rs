//! Atomic report file writes.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error_handling::RunError;

/// Writes `bytes` to `path` so that readers see either the old file or the
/// complete new one.
///
/// The data goes to a temporary file in the same directory, is synced, and is
/// then renamed over `path`. On failure the temporary file is removed.
///
/// # Errors
///
/// Returns `RunError::WriteReport` if any step fails.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), RunError> {
    let to_error = |source: std::io::Error| RunError::WriteReport {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(to_error)?;
    file.write_all(bytes).map_err(to_error)?;
    file.as_file().sync_all().map_err(to_error)?;
    file.persist(path).map_err(|e| to_error(e.error))?;
    Ok(())
}
