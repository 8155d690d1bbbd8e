//! Local analysis engine invocation
//!
//! Runs the `inferscope-engine` binary when it is installed on PATH.
//! Absence of the binary is not an error: callers fall back to the API.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use super::AnalysisError;
use super::types::{AnalysisOptions, AnalysisResult};
use crate::core::constants::{ANALYSIS_TIMEOUT_SECS, ENGINE_BINARY_NAME};

/// Locate the engine binary on PATH
fn find_engine_binary() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        let candidate = dir.join(ENGINE_BINARY_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{}.exe", ENGINE_BINARY_NAME));
            if exe.is_file() {
                return Some(exe);
            }
        }
    }
    None
}

/// Analyze `path` via the local engine binary.
///
/// Returns `Ok(None)` when the binary is not installed or its invocation
/// fails, allowing a graceful fallback to the remote API. Only a timeout is
/// surfaced as an error: a hung engine should not look like "not installed".
pub async fn analyze_via_cli(
    path: &Path,
    options: &AnalysisOptions,
) -> Result<Option<AnalysisResult>, AnalysisError> {
    let Some(binary) = find_engine_binary() else {
        tracing::debug!(binary = ENGINE_BINARY_NAME, "Local engine not found on PATH");
        return Ok(None);
    };

    let mut command = Command::new(&binary);
    command
        .arg("analyze")
        .arg(path)
        .args(["--output", "json"]);
    if options.fixes {
        command.arg("--fixes");
    }
    if options.benchmark {
        command.arg("--benchmark");
    }

    let timeout = Duration::from_secs(ANALYSIS_TIMEOUT_SECS);
    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Local engine invocation failed");
            return Ok(None);
        }
        Err(_) => return Err(AnalysisError::Timeout(ANALYSIS_TIMEOUT_SECS)),
    };

    if !output.status.success() {
        tracing::debug!(status = ?output.status.code(), "Local engine exited non-zero");
        return Ok(None);
    }

    match serde_json::from_slice::<AnalysisResult>(&output.stdout) {
        Ok(result) => Ok(Some(result)),
        Err(e) => {
            tracing::debug!(error = %e, "Local engine produced unparseable JSON");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_falls_back_to_none() {
        // ENGINE_BINARY_NAME is not installed in the test environment
        let result = analyze_via_cli(Path::new("."), &AnalysisOptions::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
