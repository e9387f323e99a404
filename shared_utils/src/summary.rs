//! End-of-rip summary and `rip-report.json`.

use crate::errors::Result;
use crate::ui;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const REPORT_FILE_NAME: &str = "rip-report.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputFile {
    pub name: String,
    pub size_bytes: u64,
}

/// Files directly in `dir` whose extension is in `exts` (case-insensitive),
/// sorted by name.
pub fn collect_outputs(dir: &Path, exts: &[&str]) -> Result<Vec<OutputFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if !matches {
            continue;
        }
        let meta = entry.metadata()?;
        if meta.is_file() {
            files.push(OutputFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                size_bytes: meta.len(),
            });
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

pub fn summary_lines(dir: &Path, files: &[OutputFile]) -> Vec<String> {
    let mut lines = vec!["Created files:".to_string()];
    for f in files {
        lines.push(format!("  ✓ {} ({})", f.name, ui::format_mb(f.size_bytes)));
    }
    let total: u64 = files.iter().map(|f| f.size_bytes).sum();
    lines.push(String::new());
    lines.push(format!("Total: {} file(s), {}", files.len(), ui::format_mb(total)));
    lines.push(format!("Location: {}", dir.display()));
    lines
}

pub fn print_summary(dir: &Path, files: &[OutputFile]) {
    ui::print_header("Rip Summary");
    for line in summary_lines(dir, files) {
        if line.starts_with("  ✓") {
            println!("{}", ui::success().apply_to(line));
        } else {
            println!("{}", line);
        }
    }
}

/// Machine-readable record of one rip, written next to the outputs.
#[derive(Debug, Clone, Serialize)]
pub struct RipReport {
    pub program: String,
    pub version: String,
    pub device: String,
    pub disc_label: Option<String>,
    pub format: String,
    pub quality: Option<String>,
    pub outputs: Vec<OutputFile>,
    pub failed_titles: Vec<u32>,
    pub created_at: DateTime<Local>,
}

impl RipReport {
    pub fn new(program: &str, version: &str, device: &str) -> Self {
        Self {
            program: program.to_string(),
            version: version.to_string(),
            device: device.to_string(),
            disc_label: None,
            format: String::new(),
            quality: None,
            outputs: Vec::new(),
            failed_titles: Vec::new(),
            created_at: Local::now(),
        }
    }
}

pub fn write_report(dir: &Path, report: &RipReport) -> Result<PathBuf> {
    let path = dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(report).map_err(std::io::Error::from)?;
    std::fs::write(&path, json)?;
    tracing::info!(path = %path.display(), outputs = report.outputs.len(), "Wrote rip report");
    Ok(path)
}
