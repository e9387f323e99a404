//! Dependency checks
//!
//! Reports which external tools are installed. Nothing is ever installed from
//! here; a missing tool ends the run with the apt command that would fix it.

use crate::errors::{Result, RipError};
use crate::runner::{CommandRunner, ToolCommand};
use crate::ui;

/// One external tool a workflow needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    /// Binary looked up on PATH.
    pub binary: &'static str,
    /// Package that provides it.
    pub package: &'static str,
    /// Display name.
    pub label: &'static str,
}

impl Requirement {
    pub const fn new(binary: &'static str, package: &'static str, label: &'static str) -> Self {
        Self {
            binary,
            package,
            label,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyReport {
    pub installed: Vec<Requirement>,
    pub missing: Vec<Requirement>,
}

impl DependencyReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Packages to install, deduplicated, in first-seen order.
    pub fn missing_packages(&self) -> Vec<&'static str> {
        let mut packages: Vec<&'static str> = Vec::new();
        for req in &self.missing {
            if !packages.contains(&req.package) {
                packages.push(req.package);
            }
        }
        packages
    }

    pub fn install_hint(&self) -> String {
        format!(
            "sudo apt update && sudo apt install {}",
            self.missing_packages().join(" ")
        )
    }
}

pub fn scan_requirements(runner: &dyn CommandRunner, requirements: &[Requirement]) -> DependencyReport {
    let mut report = DependencyReport::default();
    for req in requirements {
        match runner.locate(req.binary) {
            Some(path) => {
                tracing::debug!(binary = req.binary, path = ?path, "Found dependency");
                report.installed.push(*req);
            }
            None => {
                tracing::warn!(binary = req.binary, package = req.package, "Missing dependency");
                report.missing.push(*req);
            }
        }
    }
    report
}

/// Print one line per requirement and fail if anything is missing.
pub fn check_requirements(runner: &dyn CommandRunner, requirements: &[Requirement]) -> Result<DependencyReport> {
    ui::print_header("Checking Dependencies");

    let report = scan_requirements(runner, requirements);
    for req in requirements {
        if report.installed.contains(req) {
            ui::print_success(&format!("{} is installed", req.label));
        } else {
            ui::print_error(&format!("{} is NOT installed", req.label));
        }
    }

    if report.is_complete() {
        return Ok(report);
    }

    let names: Vec<&str> = report.missing.iter().map(|r| r.label).collect();
    println!();
    ui::print_warning(&format!("Missing: {}", names.join(", ")));
    ui::print_info("To install on Debian/Ubuntu:");
    println!("  {}", report.install_hint());
    ui::print_error("Cannot proceed without required packages");

    Err(RipError::ToolNotFound(names.join(", ")))
}

/// Whether the dynamic linker cache knows `name` (e.g. `libdvdcss`).
pub fn has_shared_library(runner: &dyn CommandRunner, name: &str) -> bool {
    match runner.capture(&ToolCommand::new("ldconfig").arg("-p")) {
        Ok(out) => out.success() && out.stdout.lines().any(|l| l.contains(name)),
        Err(e) => {
            tracing::warn!(library = name, error = %e, "Could not query ldconfig");
            false
        }
    }
}

/// libdvdcss is optional: unencrypted discs rip without it.
pub fn warn_if_no_libdvdcss(runner: &dyn CommandRunner) -> bool {
    if has_shared_library(runner, "libdvdcss") {
        ui::print_success("libdvdcss is installed (DVD decryption)");
        true
    } else {
        ui::print_warning("libdvdcss not found - encrypted DVDs may not work");
        println!("  sudo apt install libdvd-pkg && sudo dpkg-reconfigure libdvd-pkg");
        false
    }
}
