//! makemkvcon command lines (robot mode).

use shared_utils::ToolCommand;
use std::path::Path;

/// Drive listing; `disc:9999` makes makemkvcon enumerate drives and stop.
pub fn drive_probe() -> ToolCommand {
    ToolCommand::new("makemkvcon").args(["-r", "--cache=1", "info", "disc:9999"])
}

pub fn disc_info(device: &str, min_secs: u64) -> ToolCommand {
    ToolCommand::new("makemkvcon")
        .args(["-r", "--cache=1"])
        .arg(format!("--minlength={}", min_secs))
        .arg("info")
        .arg(format!("dev:{}", device))
}

/// Rip title `index` (zero-based) into `dest_dir`. makemkvcon numbers titles
/// after its length filter, so `min_secs` must match the `info` call.
pub fn rip_title(device: &str, min_secs: u64, index: u32, dest_dir: &Path) -> ToolCommand {
    ToolCommand::new("makemkvcon")
        .args(["-r", "--progress=-same"])
        .arg(format!("--minlength={}", min_secs))
        .arg("mkv")
        .arg(format!("dev:{}", device))
        .arg(index.to_string())
        .path_arg(dest_dir)
}
