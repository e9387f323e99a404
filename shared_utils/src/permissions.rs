//! Permission fixing for ripped trees.
//!
//! Library shares are read by other users and media servers, so everything a
//! rip produces gets the configured mode.

use crate::ui;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use walkdir::WalkDir;

/// Set `mode` on `path` and everything below it. Never fails the rip;
/// returns whether every entry was updated.
pub fn fix_permissions(path: &Path, mode: u32) -> bool {
    ui::print_info(&format!("Setting permissions for: {}", path.display()));

    let mut failures = 0usize;
    for entry in WalkDir::new(path) {
        let result = entry
            .map_err(std::io::Error::from)
            .and_then(|e| fs::set_permissions(e.path(), fs::Permissions::from_mode(mode)));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "chmod failed");
            failures += 1;
        }
    }

    if failures == 0 {
        ui::print_success(&format!("Permissions set successfully ({:o})", mode));
        true
    } else {
        ui::print_warning("Failed to set permissions (you may need to do this manually)");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn test_fix_permissions_recursive() {
        let dir = TempDir::new().unwrap();
        let album = dir.path().join("Artist").join("Album");
        fs::create_dir_all(&album).unwrap();
        let track = album.join("01 - Intro.flac");
        fs::write(&track, b"fLaC").unwrap();
        fs::set_permissions(&track, fs::Permissions::from_mode(0o600)).unwrap();

        assert!(fix_permissions(&dir.path().join("Artist"), 0o755));
        assert_eq!(mode_of(&track), 0o755);
        assert_eq!(mode_of(&album), 0o755);
    }

    #[test]
    fn test_missing_path_warns() {
        let dir = TempDir::new().unwrap();
        assert!(!fix_permissions(&dir.path().join("gone"), 0o777));
    }
}
