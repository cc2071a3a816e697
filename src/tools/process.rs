//! Running external tools.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Check whether `program` runs and exits successfully with `version_arg`.
fn responds(program: &Path, version_arg: &str) -> bool {
    Command::new(program)
        .arg(version_arg)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Find a working executable.
///
/// A configured path is used as-is if it responds; otherwise the first
/// responding candidate wins.
pub fn find_tool(
    configured: Option<&Path>,
    candidates: &[&str],
    version_arg: &str,
) -> Option<PathBuf> {
    if let Some(path) = configured {
        return responds(path, version_arg).then(|| path.to_path_buf());
    }

    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| responds(path, version_arg))
}

/// First line of a tool's version output (for diagnostics).
pub fn tool_version(program: &Path, version_arg: &str) -> Option<String> {
    Command::new(program)
        .arg(version_arg)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string())
        })
}

/// Run a tool to completion, failing on a non-zero exit status.
///
/// `tool` names the collaborator in errors and logs.
pub(crate) async fn run_tool(tool: &str, program: &Path, args: &[OsString]) -> Result<()> {
    tracing::debug!("Running {}: {:?} {:?}", tool, program, args);

    let output = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| Error::collaborator(None, tool, format!("failed to start: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::collaborator(
            None,
            tool,
            format!("{}: {}", output.status, stderr.trim()),
        ));
    }

    Ok(())
}
