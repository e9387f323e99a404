//! Enhanced CD data session: copy out and convert videos.

use shared_utils::errors::Result;
use shared_utils::mount::{self, MountGuard};
use shared_utils::{encode, naming, permissions, ui};
use shared_utils::{CommandRunner, Prompter};
use std::path::{Path, PathBuf};

pub const ENHANCED_DIR_NAME: &str = "Enhanced Content";

/// Video containers worth converting to MP4.
pub const VIDEO_EXTENSIONS: &[&str] = &["flv", "mov", "avi", "wmv", "mpg", "mpeg"];

pub struct EnhancedExtractor<'a> {
    pub runner: &'a dyn CommandRunner,
    pub prompter: &'a dyn Prompter,
    pub device: &'a str,
    pub mount_point: &'a Path,
    pub mode: u32,
}

impl EnhancedExtractor<'_> {
    /// Copy the data session into `<output_dir>/Enhanced Content`. Returns
    /// the content directory when anything was copied.
    pub fn extract(&self, output_dir: &Path) -> Result<Option<PathBuf>> {
        ui::print_header("Extracting Enhanced Content");
        let enhanced_dir = output_dir.join(ENHANCED_DIR_NAME);

        let guard = match mount::mount_data_session(self.runner, self.device, self.mount_point) {
            Ok(guard) => guard,
            Err(e) => {
                tracing::warn!(error = %e, "No data session mounted");
                return Ok(None);
            }
        };

        ui::print_info("Checking mounted content...");
        let entries = mount::list_entries(guard.path())?;
        if entries.is_empty() {
            ui::print_warning("No additional content found in data session");
            return Ok(None);
        }

        println!("\n{}", ui::info().apply_to("Found content:"));
        for (name, size) in &entries {
            println!("  {:>10}  {}", ui::format_mb(*size), name);
        }

        ui::print_info("Copying enhanced content...");
        let copied = self.copy_and_unmount(guard, &enhanced_dir);
        match copied {
            Ok(count) => {
                tracing::info!(files = count, dir = %enhanced_dir.display(), "Enhanced content copied");
                ui::print_success(&format!("Enhanced content saved to: {}", enhanced_dir.display()));
            }
            Err(e) => {
                ui::print_error(&format!("Failed to copy enhanced content: {}", e));
                return Ok(None);
            }
        }

        permissions::fix_permissions(&enhanced_dir, self.mode);
        self.convert_videos(&enhanced_dir)?;
        Ok(Some(enhanced_dir))
    }

    fn copy_and_unmount(&self, guard: MountGuard<'_>, target: &Path) -> Result<usize> {
        let copied = mount::copy_tree(guard.path(), target);
        guard.unmount()?;
        copied
    }

    /// Offer to convert top-level videos in `dir` to MP4. Returns how many
    /// were converted.
    pub fn convert_videos(&self, dir: &Path) -> Result<usize> {
        ui::print_header("Checking for Videos to Convert");
        let videos = find_videos(dir)?;
        if videos.is_empty() {
            ui::print_info("No videos found to convert");
            return Ok(0);
        }

        ui::print_info(&format!("Found {} video file(s)", videos.len()));
        for video in &videos {
            println!("  - {}", file_name(video));
        }
        if !self.prompter.confirm("Would you like to convert these videos to MP4?")? {
            return Ok(0);
        }

        let mut converted = 0;
        for video in &videos {
            let name = file_name(video);
            ui::print_info(&format!("Converting {}...", name));
            let stem = video.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            let clean = naming::sanitize_component(&naming::clean_video_stem(&stem), "video");
            let output = dir.join(format!("{}.mp4", clean));

            let status = self.runner.run_attached(&encode::video_to_mp4(video, &output))?;
            if !status.success() {
                ui::print_error(&format!("Failed to convert {}", name));
                continue;
            }
            ui::print_success(&format!("Converted to: {}.mp4", clean));
            permissions::fix_permissions(&output, self.mode);
            converted += 1;

            if self.prompter.confirm(&format!("Delete original {}?", name))? {
                std::fs::remove_file(video)?;
                ui::print_success(&format!("Deleted {}", name));
            }
        }
        Ok(converted)
    }
}

/// Top-level files in `dir` with a video extension, any case, sorted.
pub fn find_videos(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut videos: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(e)))
        })
        .collect();
    videos.sort();
    Ok(videos)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
