//! DVD rip workflow: detect, scan, choose profile, rip titles, tidy up.

use crate::handbrake;
use shared_utils::deps::{self, Requirement};
use shared_utils::parse::{handbrake as hb_parse, lsdvd};
use shared_utils::profile::{self, OutputFormat, QualityPreset, SHARED_FORMATS};
use shared_utils::session::{self, RipMode, SessionOutcome, TitleJob};
use shared_utils::summary::{self, RipReport};
use shared_utils::verify::{self, verify_output, VerifiedOutput};
use shared_utils::{drive, encode, naming, permissions, title, ui};
use shared_utils::{CommandRunner, DiscInfo, Prompter, Result, RipError, RipperConfig};
use std::path::{Path, PathBuf};

pub const PROGRAM: &str = "dvd-rip";

pub const REQUIREMENTS: &[Requirement] = &[
    Requirement::new("HandBrakeCLI", "handbrake-cli", "HandBrake CLI"),
    Requirement::new("ffmpeg", "ffmpeg", "FFmpeg"),
    Requirement::new("ffprobe", "ffmpeg", "FFprobe"),
    Requirement::new("lsdvd", "lsdvd", "lsdvd"),
];

/// Extensions the summary counts as rip output.
const OUTPUT_EXTENSIONS: &[&str] = &["mp4", "mkv", "flac", "mp3"];

/// How one pass over a disc ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscOutcome {
    /// The user declined to rip.
    Cancelled,
    Finished { success: bool, dir: PathBuf },
}

pub struct DvdRipper<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    config: RipperConfig,
}

impl<'a> DvdRipper<'a> {
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

    /// Check dependencies once, then rip discs until the user stops.
    pub fn run(&self) -> Result<()> {
        ui::print_header("DVD Ripper - Music DVD Content Extraction");
        deps::check_requirements(self.runner, REQUIREMENTS)?;
        deps::warn_if_no_libdvdcss(self.runner);

        loop {
            if self.rip_disc()? == DiscOutcome::Cancelled {
                return Ok(());
            }
            if !self.prompter.confirm("Would you like to rip another DVD?")? {
                return Ok(());
            }
            println!("\n");
        }
    }

    pub fn rip_disc(&self) -> Result<DiscOutcome> {
        self.wait_for_dvd()?;
        let info = self.analyze()?;

        let format = profile::choose_format(self.prompter, &SHARED_FORMATS)?;
        let quality = profile::choose_quality(self.prompter, format)?;
        let dir = session::output_settings(self.prompter, &self.config.dvd_output_dir, info.label.as_deref())?;

        if !self.prompter.confirm("Would you like to proceed with ripping this DVD?")? {
            ui::print_info("Operation cancelled");
            return Ok(DiscOutcome::Cancelled);
        }

        let rip = |job: &TitleJob| self.rip_title(job, &dir, format, quality);
        let outcome = match session::choose_mode(self.prompter)? {
            RipMode::Batch => session::run_batch(self.prompter, &info.titles, self.config.min_title_secs, rip)?,
            RipMode::Selective => session::run_selective(self.prompter, &info.titles, rip)?,
        };

        if outcome.any_succeeded() {
            self.wrap_up(&dir, &info, format, quality, &outcome)?;
        }

        drive::offer_eject(self.runner, self.prompter, self.device(), "DVD")?;
        let success = outcome.any_succeeded();
        session::print_completion(success);
        Ok(DiscOutcome::Finished { success, dir })
    }

    fn wait_for_dvd(&self) -> Result<()> {
        ui::print_header("Checking for DVD");
        drive::wait_for_media(self.prompter, "DVD", || {
            let out = self.runner.capture(&handbrake::lsdvd_probe(self.device()))?;
            Ok(out.success() && !lsdvd::is_unreadable(&out.combined()))
        })?;
        Ok(())
    }

    /// lsdvd for the label, then a HandBrake scan whose titles win when it
    /// finds any.
    pub fn analyze(&self) -> Result<DiscInfo> {
        ui::print_header("Analyzing DVD");

        let out = self.runner.capture(&handbrake::lsdvd_details(self.device()))?;
        let mut info = if out.success() {
            lsdvd::parse(&out.combined())
        } else {
            DiscInfo::default()
        };
        println!("\n{}", ui::info().apply_to("DVD Information:"));
        println!("  Disc Title: {}", ui::emphasis().apply_to(info.label_or_default()));

        let spinner = ui::create_spinner("Scanning with HandBrake (this may take a moment)...");
        let scan = self.runner.capture(&handbrake::scan(self.device()));
        spinner.finish_and_clear();
        let scanned = hb_parse::parse_scan(&scan?.combined());
        if !scanned.is_empty() {
            tracing::info!(lsdvd = info.titles.len(), handbrake = scanned.len(), "Using HandBrake titles");
            info.titles = scanned;
        }

        if info.titles.is_empty() {
            ui::print_warning("No titles found on DVD");
        } else {
            println!("\n{}", ui::info().apply_to(format!("Titles found: {}", info.titles.len())));
            title::display_titles(&info.titles, self.config.max_listed_titles);
        }
        Ok(info)
    }

    /// Rip one title into `dir`, returning the verified output file.
    pub fn rip_title(
        &self,
        job: &TitleJob,
        dir: &Path,
        format: OutputFormat,
        quality: QualityPreset,
    ) -> Result<VerifiedOutput> {
        let file_name = naming::track_file_name(Some(job.track), &job.name, format.extension());
        let output = dir.join(&file_name);
        let number = job.title.number;

        let result = if format.is_audio_only() {
            self.rip_audio_only(number, &output, format, quality)
        } else {
            self.encode_video(number, &output, format, quality)
        };
        if result.is_err() {
            verify::discard_partial(&output);
        }
        result
    }

    fn encode_video(
        &self,
        number: u32,
        output: &Path,
        format: OutputFormat,
        quality: QualityPreset,
    ) -> Result<VerifiedOutput> {
        ui::print_info(&format!("Ripping title {} to {}...", number, format.name()));
        let cmd = handbrake::encode_title(self.device(), number, output, format, quality);
        let status = self.runner.run_attached(&cmd)?;
        if !status.success() {
            return Err(RipError::ToolFailed {
                tool: "HandBrakeCLI".to_string(),
                exit_code: status.exit_code,
                stderr: String::new(),
            });
        }
        verify_output(self.runner, output, true)
    }

    /// HandBrake into a temporary MKV, then ffmpeg pulls the audio out.
    fn rip_audio_only(
        &self,
        number: u32,
        output: &Path,
        format: OutputFormat,
        quality: QualityPreset,
    ) -> Result<VerifiedOutput> {
        ui::print_info(&format!("Extracting audio from title {}...", number));
        let scratch = tempfile::Builder::new().prefix("dvd-rip-audio-").tempdir()?;
        let temp_mkv = scratch.path().join(format!("title_{}.mkv", number));

        let status = self
            .runner
            .run_attached(&handbrake::extract_for_audio(self.device(), number, &temp_mkv))?;
        if !status.success() || !temp_mkv.is_file() {
            ui::print_error("Failed to extract title for audio processing");
            return Err(RipError::ToolFailed {
                tool: "HandBrakeCLI".to_string(),
                exit_code: status.exit_code,
                stderr: String::new(),
            });
        }

        let status = self
            .runner
            .run_attached(&encode::extract_audio(&temp_mkv, output, format, quality))?;
        if !status.success() {
            ui::print_error("Audio extraction failed");
            return Err(RipError::ToolFailed {
                tool: "ffmpeg".to_string(),
                exit_code: status.exit_code,
                stderr: String::new(),
            });
        }
        verify_output(self.runner, output, true)
    }

    fn wrap_up(
        &self,
        dir: &Path,
        info: &DiscInfo,
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
        report.disc_label = info.label.clone();
        report.format = format.name().to_string();
        report.quality = format.needs_quality().then(|| quality.name().to_string());
        report.outputs = files;
        report.failed_titles = outcome.failed.clone();
        match summary::write_report(dir, &report) {
            Ok(path) => tracing::debug!(path = %path.display(), "Report written"),
            Err(e) => ui::print_warning(&format!("Could not write rip report: {}", e)),
        }
        Ok(())
    }
}
