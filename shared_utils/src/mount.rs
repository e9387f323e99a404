//! Data-session mounting for enhanced CDs

use crate::errors::{Result, RipError};
use crate::runner::{CommandRunner, ToolCommand};
use crate::ui;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// `-o` option sets tried in order.
pub const MOUNT_ATTEMPTS: [&str; 3] = ["session=1,ro", "session=2,ro", "ro"];

/// Unmounts on drop.
pub struct MountGuard<'a> {
    runner: &'a dyn CommandRunner,
    mount_point: PathBuf,
    mounted: bool,
}

impl MountGuard<'_> {
    pub fn path(&self) -> &Path {
        &self.mount_point
    }

    pub fn unmount(mut self) -> Result<bool> {
        self.release()
    }

    fn release(&mut self) -> Result<bool> {
        if !self.mounted {
            return Ok(true);
        }
        self.mounted = false;
        let out = self
            .runner
            .capture(&ToolCommand::new("umount").path_arg(&self.mount_point))?;
        if !out.success() {
            tracing::warn!(mount_point = %self.mount_point.display(), stderr = %out.stderr.trim(), "umount failed");
        }
        Ok(out.success())
    }
}

impl Drop for MountGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "umount on drop failed");
        }
    }
}

pub fn mount_data_session<'a>(
    runner: &'a dyn CommandRunner,
    device: &str,
    mount_point: &Path,
) -> Result<MountGuard<'a>> {
    fs::create_dir_all(mount_point).map_err(|e| {
        RipError::Mount(format!("cannot create {}: {}", mount_point.display(), e))
    })?;

    ui::print_info("Attempting to mount data session...");
    for (i, options) in MOUNT_ATTEMPTS.iter().copied().enumerate() {
        let cmd = ToolCommand::new("mount")
            .args(["-t", "iso9660", "-o", options, device])
            .path_arg(mount_point);
        let out = runner.capture(&cmd)?;
        if out.success() {
            tracing::info!(device, options, "Mounted data session");
            return Ok(MountGuard {
                runner,
                mount_point: mount_point.to_path_buf(),
                mounted: true,
            });
        }
        tracing::debug!(options, stderr = %out.stderr.trim(), "mount attempt failed");
        match MOUNT_ATTEMPTS.get(i + 1) {
            Some(next) => ui::print_warning(&format!("Failed to mount with {}, trying {}...", options, next)),
            None => ui::print_error("Could not mount enhanced content - this may not be an enhanced CD"),
        }
    }

    Err(RipError::Mount(format!("no data session on {}", device)))
}

/// Top-level entries of `dir` with their sizes (directories report 0).
pub fn list_entries(dir: &Path) -> Result<Vec<(String, u64)>> {
    let mut entries: Vec<(String, u64)> = fs::read_dir(dir)?
        .flatten()
        .map(|e| {
            let size = e.metadata().map(|m| if m.is_file() { m.len() } else { 0 }).unwrap_or(0);
            (e.file_name().to_string_lossy().into_owned(), size)
        })
        .collect();
    entries.sort();
    Ok(entries)
}

/// Recursive copy of the contents of `from` into `to`. Returns files copied.
pub fn copy_tree(from: &Path, to: &Path) -> Result<usize> {
    fs::create_dir_all(to)?;
    let mut copied = 0;
    for entry in WalkDir::new(from).min_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            tracing::debug!(file = %relative.display(), "Copied");
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failed, FakeRunner};
    use tempfile::TempDir;

    #[test]
    fn test_mount_falls_back_and_unmounts_on_drop() {
        let dir = TempDir::new().unwrap();
        let point = dir.path().join("cdrom-data");
        let fake = FakeRunner::new();
        fake.respond("mount", &["session=1,ro"], failed(32, "wrong fs type"));

        {
            let guard = mount_data_session(&fake, "/dev/sr0", &point).unwrap();
            assert_eq!(guard.path(), point.as_path());
            assert!(point.is_dir());
        }

        let mounts = fake.calls_to("mount");
        assert_eq!(mounts.len(), 2);
        assert_eq!(mounts[1].arg_after("-o"), Some("session=2,ro"));
        assert_eq!(fake.calls_to("umount").len(), 1);
    }

    #[test]
    fn test_mount_all_attempts_fail() {
        let dir = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        fake.respond("mount", &[], failed(32, "wrong fs type"));
        let err = mount_data_session(&fake, "/dev/sr0", dir.path()).err().unwrap();
        assert!(matches!(err, RipError::Mount(_)));
        assert_eq!(fake.calls_to("mount").len(), 3);
        assert!(fake.calls_to("umount").is_empty());
    }

    #[test]
    fn test_explicit_unmount_runs_once() {
        let dir = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        let guard = mount_data_session(&fake, "/dev/sr0", dir.path()).unwrap();
        assert!(guard.unmount().unwrap());
        assert_eq!(fake.calls_to("umount").len(), 1);
    }

    #[test]
    fn test_copy_tree_and_list() {
        let src = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("VIDEO")).unwrap();
        fs::write(src.path().join("VIDEO").join("clip.mov"), vec![0u8; 2048]).unwrap();
        fs::write(src.path().join("autorun.inf"), b"[autorun]").unwrap();

        let entries = list_entries(src.path()).unwrap();
        assert_eq!(entries, vec![("VIDEO".to_string(), 0), ("autorun.inf".to_string(), 9)]);

        let dst = TempDir::new().unwrap();
        let target = dst.path().join("Enhanced Content");
        assert_eq!(copy_tree(src.path(), &target).unwrap(), 2);
        assert_eq!(fs::metadata(target.join("VIDEO").join("clip.mov")).unwrap().len(), 2048);
    }
}
