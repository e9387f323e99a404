//! MakeMKV rip workflow. Same shape as the HandBrake ripper, but titles are
//! extracted losslessly first and converted with ffmpeg only on request.

use crate::makemkv;
use shared_utils::deps::{self, Requirement};
use shared_utils::parse::makemkv::{self as robot, MakeMkvDisc, MakeMkvTitle};
use shared_utils::profile::{self, OutputFormat, QualityPreset, MAKEMKV_FORMATS};
use shared_utils::session::{self, RipMode, SessionOutcome, TitleJob};
use shared_utils::summary::{self, RipReport};
use shared_utils::verify::{self, verify_output, VerifiedOutput};
use shared_utils::{drive, encode, naming, permissions, title, ui};
use shared_utils::{CommandRunner, Prompter, Result, RipError, RipperConfig};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const PROGRAM: &str = "mkv-rip";

pub const REQUIREMENTS: &[Requirement] = &[
    Requirement::new("makemkvcon", "makemkv-bin", "MakeMKV"),
    Requirement::new("ffmpeg", "ffmpeg", "FFmpeg"),
    Requirement::new("ffprobe", "ffmpeg", "FFprobe"),
];

const OUTPUT_EXTENSIONS: &[&str] = &["mkv", "mp4", "flac", "mp3"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscOutcome {
    Cancelled,
    Finished { success: bool, dir: PathBuf },
}

pub struct MkvRipper<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    config: RipperConfig,
}

impl<'a> MkvRipper<'a> {
    pub fn new(runner: &'a dyn CommandRunner, prompter: &'a dyn Prompter, config: RipperConfig) -> Self {
        Self {
            runner,
            prompter,
            config,
        }
    }

    fn device(&self) -> &str {
        &self.config.device
    }

    pub fn run(&self) -> Result<()> {
        ui::print_header("MKV Ripper - DVD & Blu-ray Extraction");
        if let Err(e) = deps::check_requirements(self.runner, REQUIREMENTS) {
            if self.runner.locate("makemkvcon").is_none() {
                ui::print_info("makemkv-bin is not in the Debian archive; get it from https://www.makemkv.com");
            }
            return Err(e);
        }

        loop {
            if self.rip_disc()? == DiscOutcome::Cancelled {
                return Ok(());
            }
            if !self.prompter.confirm("Would you like to rip another disc?")? {
                return Ok(());
            }
            println!("\n");
        }
    }

    pub fn rip_disc(&self) -> Result<DiscOutcome> {
        self.wait_for_disc()?;
        let disc = self.analyze()?;
        let titles = disc.disc_titles();

        let format = profile::choose_format(self.prompter, &MAKEMKV_FORMATS)?;
        let quality = profile::choose_quality(self.prompter, format)?;
        let dir = session::output_settings(self.prompter, &self.config.dvd_output_dir, disc.label.as_deref())?;

        if !self.prompter.confirm("Would you like to proceed with ripping this disc?")? {
            ui::print_info("Operation cancelled");
            return Ok(DiscOutcome::Cancelled);
        }

        let rip = |job: &TitleJob| self.rip_title(&disc, job, &dir, format, quality);
        let outcome = match session::choose_mode(self.prompter)? {
            RipMode::Batch => session::run_batch(self.prompter, &titles, self.config.min_title_secs, rip)?,
            RipMode::Selective => session::run_selective(self.prompter, &titles, rip)?,
        };

        if outcome.any_succeeded() {
            self.wrap_up(&dir, &disc, format, quality, &outcome)?;
        }

        drive::offer_eject(self.runner, self.prompter, self.device(), "disc")?;
        let success = outcome.any_succeeded();
        session::print_completion(success);
        Ok(DiscOutcome::Finished { success, dir })
    }

    fn wait_for_disc(&self) -> Result<()> {
        ui::print_header("Checking for Disc");
        drive::wait_for_media(self.prompter, "disc", || {
            let out = self.runner.capture(&makemkv::drive_probe())?;
            Ok(robot::drive_has_disc(&out.stdout, self.device()))
        })?;
        Ok(())
    }

    pub fn analyze(&self) -> Result<MakeMkvDisc> {
        ui::print_header("Analyzing Disc");
        let spinner = ui::create_spinner("Reading disc structure with MakeMKV...");
        let out = self
            .runner
            .capture(&makemkv::disc_info(self.device(), self.config.min_title_secs));
        spinner.finish_and_clear();
        let out = out?;
        if !out.success() {
            tracing::warn!(exit_code = ?out.exit_code, "makemkvcon info failed");
        }

        let disc = robot::parse_info(&out.stdout);
        println!("\n{}", ui::info().apply_to("Disc Information:"));
        println!(
            "  Disc Title: {}",
            ui::emphasis().apply_to(disc.label.as_deref().unwrap_or("Unknown Disc"))
        );
        if disc.titles.is_empty() {
            ui::print_warning("No titles found on disc");
        } else {
            let titles = disc.disc_titles();
            println!("\n{}", ui::info().apply_to(format!("Titles found: {}", titles.len())));
            title::display_titles(&titles, self.config.max_listed_titles);
        }
        Ok(disc)
    }

    /// Extract one title with makemkvcon into a staging directory beside the
    /// outputs, then move or convert it into place.
    pub fn rip_title(
        &self,
        disc: &MakeMkvDisc,
        job: &TitleJob,
        dir: &Path,
        format: OutputFormat,
        quality: QualityPreset,
    ) -> Result<VerifiedOutput> {
        let mkv_title = disc.by_number(job.title.number).ok_or_else(|| RipError::ToolFailed {
            tool: "makemkvcon".to_string(),
            exit_code: None,
            stderr: format!("title {} not reported by makemkvcon", job.title.number),
        })?;
        let output = dir.join(naming::track_file_name(Some(job.track), &job.name, format.extension()));

        let result = self.extract_title(mkv_title, job.title.number, dir, &output, format, quality);
        if result.is_err() {
            verify::discard_partial(&output);
        }
        result
    }

    fn extract_title(
        &self,
        mkv_title: &MakeMkvTitle,
        number: u32,
        dir: &Path,
        output: &Path,
        format: OutputFormat,
        quality: QualityPreset,
    ) -> Result<VerifiedOutput> {
        let staging = tempfile::Builder::new().prefix(".mkv-rip-").tempdir_in(dir)?;
        ui::print_info(&format!("Extracting title {} with MakeMKV...", number));
        let cmd = makemkv::rip_title(
            self.device(),
            self.config.min_title_secs,
            mkv_title.index,
            staging.path(),
        );
        let status = self.runner.run_attached(&cmd)?;
        if !status.success() {
            return Err(RipError::ToolFailed {
                tool: "makemkvcon".to_string(),
                exit_code: status.exit_code,
                stderr: String::new(),
            });
        }

        let ripped = find_ripped_mkv(staging.path(), mkv_title.output_file_name.as_deref())
            .ok_or_else(|| RipError::OutputMissing(staging.path().to_path_buf()))?;

        if format == OutputFormat::Remux {
            std::fs::rename(&ripped, output)?;
        } else {
            ui::print_info(&format!("Converting to {}...", format.name()));
            let cmd = if format.is_audio_only() {
                encode::extract_audio(&ripped, output, format, quality)
            } else {
                encode::transcode_video(&ripped, output, format, quality)
            };
            let status = self.runner.run_attached(&cmd)?;
            if !status.success() {
                return Err(RipError::ToolFailed {
                    tool: "ffmpeg".to_string(),
                    exit_code: status.exit_code,
                    stderr: String::new(),
                });
            }
        }
        verify_output(self.runner, output, true)
    }

    fn wrap_up(
        &self,
        dir: &Path,
        disc: &MakeMkvDisc,
        format: OutputFormat,
        quality: QualityPreset,
        outcome: &SessionOutcome,
    ) -> Result<()> {
        permissions::fix_permissions(dir, self.config.file_mode()?);

        let files = summary::collect_outputs(dir, OUTPUT_EXTENSIONS)?;
        if files.is_empty() {
            ui::print_warning("No files were created");
        } else {
            summary::print_summary(dir, &files);
        }

        let mut report = RipReport::new(PROGRAM, env!("CARGO_PKG_VERSION"), self.device());
        report.disc_label = disc.label.clone();
        report.format = format.name().to_string();
        report.quality = format.needs_quality().then(|| quality.name().to_string());
        report.outputs = files;
        report.failed_titles = outcome.failed.clone();
        if let Err(e) = summary::write_report(dir, &report) {
            ui::print_warning(&format!("Could not write rip report: {}", e));
        }
        Ok(())
    }
}

/// The file makemkvcon said it would write, else the newest MKV in `dir`.
fn find_ripped_mkv(dir: &Path, reported: Option<&str>) -> Option<PathBuf> {
    if let Some(name) = reported {
        let path = dir.join(name);
        if path.is_file() {
            return Some(path);
        }
        tracing::debug!(expected = %path.display(), "Reported output missing, scanning staging dir");
    }

    std::fs::read_dir(dir)
        .ok()?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e.eq_ignore_ascii_case("mkv")))
        .filter_map(|p| {
            let modified = std::fs::metadata(&p).and_then(|m| m.modified()).ok()?;
            Some((modified, p))
        })
        .max_by_key(|(modified, _): &(SystemTime, PathBuf)| *modified)
        .map(|(_, p)| p)
}
