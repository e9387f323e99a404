//! Post-rip output checks

use crate::errors::{Result, RipError};
use crate::runner::{CommandRunner, ToolCommand};
use crate::ui;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedOutput {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub duration_secs: Option<f64>,
}

impl VerifiedOutput {
    pub fn size_mb(&self) -> String {
        ui::format_mb(self.size_bytes)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub fn probe_duration_cmd(path: &Path) -> ToolCommand {
    ToolCommand::new("ffprobe")
        .args(["-v", "error", "-show_entries", "format=duration"])
        .args(["-of", "default=noprint_wrappers=1:nokey=1"])
        .path_arg(path)
}

/// The output must exist and be non-empty. With `probe`, ffprobe also reads
/// its duration; a probe failure is only logged.
pub fn verify_output(runner: &dyn CommandRunner, path: &Path, probe: bool) -> Result<VerifiedOutput> {
    let size_bytes = match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
        _ => return Err(RipError::OutputMissing(path.to_path_buf())),
    };

    let duration_secs = if probe {
        match runner.capture(&probe_duration_cmd(path)) {
            Ok(out) if out.success() => out.stdout.trim().parse::<f64>().ok(),
            Ok(out) => {
                tracing::warn!(path = %path.display(), stderr = %out.stderr.trim(), "ffprobe failed");
                None
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ffprobe unavailable");
                None
            }
        }
    } else {
        None
    };

    Ok(VerifiedOutput {
        path: path.to_path_buf(),
        size_bytes,
        duration_secs,
    })
}

/// Remove whatever a failed encode left at `path`. Returns whether a file
/// was removed.
pub fn discard_partial(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(path = %path.display(), "Removed partial output");
            true
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not remove partial output");
            false
        }
    }
}
