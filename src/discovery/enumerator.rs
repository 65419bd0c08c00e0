//! External enumeration tool invocation.
//!
//! The tool is run as `<exe> enum -passive -d <domain> -o <raw file>` and
//! killed when the run's deadline passes. Its output file is kept verbatim
//! as a diagnostic artifact.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use log::{debug, warn};
use tokio::process::Command;
use tokio::time::Instant;

use crate::config::{EXIT_CODE_NOT_EXECUTABLE, EXIT_CODE_NOT_FOUND};
use crate::domain::Domain;

/// Longest stderr excerpt carried into an error message
const MAX_STDERR_EXCERPT: usize = 300;

/// Result of one enumerator invocation.
#[derive(Debug)]
pub enum EnumerationOutcome {
    /// The tool exited successfully
    Finished {
        /// Raw output of this invocation
        lines: String,
    },
    /// The tool is not installed or not executable
    Unavailable {
        /// Why it could not be run
        reason: String,
    },
    /// The tool ran but failed or timed out
    Failed {
        /// Exit status or timeout description
        reason: String,
        /// Whatever it produced before stopping
        lines: String,
    },
}

/// Resolves an executable name against `PATH`, or checks an explicit path.
pub fn locate_executable(name: &str) -> Option<PathBuf> {
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return is_executable(candidate).then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file() || path.with_extension("exe").is_file()
}

/// Runs the enumeration tool until it exits or `deadline` passes.
pub async fn run_enumerator(
    exe: &Path,
    domain: &Domain,
    raw_path: &Path,
    deadline: Instant,
) -> EnumerationOutcome {
    // Only a capture written by this invocation is read back.
    let capture = clear_raw(raw_path).await.then_some(raw_path);

    let child = Command::new(exe)
        .arg("enum")
        .arg("-passive")
        .arg("-d")
        .arg(domain.as_str())
        .arg("-o")
        .arg(raw_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(child) => child,
        Err(e)
            if matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
            ) =>
        {
            return EnumerationOutcome::Unavailable {
                reason: format!("{} could not be started: {e}", exe.display()),
            };
        }
        Err(e) => {
            return EnumerationOutcome::Failed {
                reason: format!("{} could not be started: {e}", exe.display()),
                lines: String::new(),
            };
        }
    };

    // Dropping the wait future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout_at(deadline, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return EnumerationOutcome::Failed {
                reason: format!("error waiting for {}: {e}", exe.display()),
                lines: read_raw(capture).await.unwrap_or_default(),
            };
        }
        Err(_) => {
            return EnumerationOutcome::Failed {
                reason: format!("{} timed out and was killed", exe.display()),
                lines: read_raw(capture).await.unwrap_or_default(),
            };
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let lines = match read_raw(capture).await {
        Some(contents) => contents,
        None => {
            if capture.is_some() && !stdout.is_empty() {
                if let Err(e) = tokio::fs::write(raw_path, stdout.as_bytes()).await {
                    debug!("Could not save raw enumerator output: {e}");
                }
            }
            stdout
        }
    };

    match output.status.code() {
        Some(0) => EnumerationOutcome::Finished { lines },
        Some(code) if code == EXIT_CODE_NOT_FOUND || code == EXIT_CODE_NOT_EXECUTABLE => {
            EnumerationOutcome::Unavailable {
                reason: format!("{} exited with status {code}", exe.display()),
            }
        }
        code => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let excerpt: String = stderr.trim().chars().take(MAX_STDERR_EXCERPT).collect();
            let status = code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
            EnumerationOutcome::Failed {
                reason: if excerpt.is_empty() {
                    format!("{} exited with {status}", exe.display())
                } else {
                    format!("{} exited with {status}: {excerpt}", exe.display())
                },
                lines,
            }
        }
    }
}

/// Removes a capture left by an earlier run. False if one is still there.
async fn clear_raw(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
        Err(e) => {
            warn!("Could not remove stale capture {}: {e}", path.display());
            false
        }
    }
}

async fn read_raw(path: Option<&Path>) -> Option<String> {
    tokio::fs::read(path?)
        .await
        .ok()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}
