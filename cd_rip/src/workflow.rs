//! Audio CD workflow: detect, analyze, rip with abcde, then handle any
//! enhanced-CD data session.

use crate::enhanced::EnhancedExtractor;
use shared_utils::deps::{self, Requirement};
use shared_utils::parse::{cdparanoia, cdrdao};
use shared_utils::{drive, naming, permissions, session, ui};
use shared_utils::{CommandRunner, Prompter, Result, RipperConfig, ToolCommand};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const PROGRAM: &str = "cd-rip";

pub const REQUIREMENTS: &[Requirement] = &[
    Requirement::new("abcde", "abcde", "abcde (A Better CD Encoder)"),
    Requirement::new("cdparanoia", "cdparanoia", "cdparanoia"),
    Requirement::new("flac", "flac", "FLAC encoder"),
    Requirement::new("ffmpeg", "ffmpeg", "FFmpeg"),
    Requirement::new("cdrdao", "cdrdao", "cdrdao"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscOutcome {
    Cancelled,
    /// abcde failed; nothing else was attempted for this disc.
    RipFailed,
    Finished { rip_dir: Option<PathBuf>, enhanced_dir: Option<PathBuf> },
}

/// Result of the abcde step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioRip {
    Failed,
    /// abcde succeeded; the album directory it wrote, if one was found.
    Done(Option<PathBuf>),
}

/// Filesystem timestamps can trail the wall clock slightly.
const MTIME_SLACK: Duration = Duration::from_secs(2);

/// What the analysis step learned about the disc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdSummary {
    pub sessions: u32,
    pub tracks: usize,
}

pub struct CdRipper<'a> {
    runner: &'a dyn CommandRunner,
    prompter: &'a dyn Prompter,
    config: RipperConfig,
}

impl<'a> CdRipper<'a> {
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

    fn disk_info(&self) -> ToolCommand {
        ToolCommand::new("cdrdao").args(["disk-info", "--device", self.device()])
    }

    pub fn run(&self) -> Result<()> {
        ui::print_header("CD Ripper - Audio & Enhanced Content");
        deps::check_requirements(self.runner, REQUIREMENTS)?;

        loop {
            if self.rip_disc()? == DiscOutcome::Cancelled {
                return Ok(());
            }
            if !self.prompter.confirm("Would you like to rip another CD?")? {
                return Ok(());
            }
            println!("\n");
        }
    }

    pub fn rip_disc(&self) -> Result<DiscOutcome> {
        self.wait_for_cd()?;
        let cd = self.analyze()?;

        if !self.prompter.confirm("Would you like to proceed with ripping this CD?")? {
            ui::print_info("Operation cancelled");
            return Ok(DiscOutcome::Cancelled);
        }

        let rip_dir = match self.rip_audio()? {
            AudioRip::Done(dir) => dir,
            AudioRip::Failed => {
                ui::print_error("Failed to rip audio tracks");
                return Ok(DiscOutcome::RipFailed);
            }
        };

        println!();
        let wants_enhanced = if cd.sessions > 1 {
            ui::print_info(&format!("This appears to be an enhanced CD ({} sessions)", cd.sessions));
            self.prompter
                .confirm("Would you like to extract enhanced content (videos, images, etc.)?")?
        } else {
            ui::print_info("This is a standard audio CD (1 session)");
            self.prompter
                .confirm("Would you still like to check for additional data content?")?
        };
        let enhanced_dir = if wants_enhanced {
            let target = match &rip_dir {
                Some(dir) => dir.clone(),
                None => self.ask_enhanced_target()?,
            };
            self.extractor()?.extract(&target)?
        } else {
            None
        };

        drive::offer_eject(self.runner, self.prompter, self.device(), "CD")?;
        session::print_completion(true);
        Ok(DiscOutcome::Finished { rip_dir, enhanced_dir })
    }

    fn wait_for_cd(&self) -> Result<()> {
        ui::print_header("Checking for CD");
        drive::wait_for_media(self.prompter, "CD", || {
            let out = self.runner.capture(&self.disk_info())?;
            Ok(out.success() && cdrdao::parse_disk_info(&out.stdout).has_disc)
        })?;
        Ok(())
    }

    pub fn analyze(&self) -> Result<CdSummary> {
        ui::print_header("Analyzing CD");

        let info = self.runner.capture(&self.disk_info())?;
        let status = cdrdao::parse_disk_info(&info.combined());
        ui::print_info(&format!("Sessions found: {}", status.sessions));

        let toc = self
            .runner
            .capture(&ToolCommand::new("cdparanoia").args(["-Q", "-d", self.device()]))?;
        let text = toc.combined();
        ui::print_block(&text);
        let tracks = cdparanoia::parse_toc(&text);
        ui::print_info(&format!("Audio tracks: {}", tracks.len()));
        tracing::info!(sessions = status.sessions, tracks = tracks.len(), "CD analyzed");

        Ok(CdSummary {
            sessions: status.sessions,
            tracks: tracks.len(),
        })
    }

    /// Run abcde in the library root, then find the album directory it
    /// wrote during this run.
    pub fn rip_audio(&self) -> Result<AudioRip> {
        ui::print_header("Ripping Audio Tracks");
        ui::print_info("Starting abcde - follow the prompts for metadata...");
        ui::print_info("You can edit artist, album, and track names when prompted");

        let base = &self.config.cd_output_dir;
        std::fs::create_dir_all(base)?;
        let cmd = ToolCommand::new("abcde")
            .args(["-d", self.device(), "-o", self.config.abcde_format.as_str()])
            .current_dir(base);
        let started = SystemTime::now() - MTIME_SLACK;
        let status = self.runner.run_attached(&cmd)?;
        if !status.success() {
            tracing::error!(exit_code = ?status.exit_code, "abcde failed");
            ui::print_error("Audio ripping failed");
            return Ok(AudioRip::Failed);
        }
        ui::print_success("Audio ripping completed!");

        let rip_dir = naming::rip_directory_since(base, started);
        match &rip_dir {
            Some(dir) => {
                permissions::fix_permissions(dir, self.config.file_mode()?);
            }
            None => ui::print_warning(&format!("Could not find rip directory in {}", base.display())),
        }
        Ok(AudioRip::Done(rip_dir))
    }

    /// No album from this run: fall back to the newest one in the library,
    /// else ask.
    fn ask_enhanced_target(&self) -> Result<PathBuf> {
        if let Some(dir) = naming::latest_rip_directory(&self.config.cd_output_dir) {
            ui::print_info(&format!("Using most recent rip directory: {}", dir.display()));
            return Ok(dir);
        }
        let answer = self
            .prompter
            .input("Enter the full path to save enhanced content", None)?;
        Ok(PathBuf::from(answer))
    }

    fn extractor(&self) -> Result<EnhancedExtractor<'_>> {
        Ok(EnhancedExtractor {
            runner: self.runner,
            prompter: self.prompter,
            device: self.device(),
            mount_point: self.config.mount_point.as_path(),
            mode: self.config.file_mode()?,
        })
    }

    pub fn output_root(&self) -> &Path {
        &self.config.cd_output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_utils::testing::{failed, ok, ok_stderr, text, Answer, FakeRunner, ScriptedPrompter};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    const DISK_INFO_ENHANCED: &str = "\
That data below may not reflect the real status of the inserted medium
if a simulation run was performed before. Reload the medium in this case.

CD-RW                : no
Total Capacity       : n/a
CD-R medium          : n/a
Recording Speed      : n/a
CD-R empty           : no
Toc Type             : CD-ROM-XA
Sessions             : 2
Last Track           : 13
Appendable           : no
";

    const TOC: &str = "\
cdparanoia III release 10.2 (September 11, 2008)

Table of contents (audio tracks only):
track        length               begin        copy pre ch
===========================================================
  1.    16503 [03:40.03]        0 [00:00.00]    no   no  2
  2.    19872 [04:24.72]    16503 [03:40.03]    no   no  2
TOTAL   36375 [08:05.00]    (audio only)
";

    fn config(root: &TempDir, mount: &TempDir) -> RipperConfig {
        RipperConfig {
            cd_output_dir: root.path().join("CD Rips"),
            mount_point: mount.path().to_path_buf(),
            permissions: "755".to_string(),
            ..RipperConfig::default()
        }
    }

    fn cd_fake(album: PathBuf) -> FakeRunner {
        let fake = FakeRunner::new();
        fake.respond("cdrdao", &["disk-info"], ok(DISK_INFO_ENHANCED));
        fake.respond("cdparanoia", &["-Q"], ok_stderr(TOC));
        fake.respond_with("abcde", &["-d"], ok(""), move |_| {
            std::fs::create_dir_all(&album).unwrap();
            std::fs::write(album.join("01.Intro.flac"), b"fLaC").unwrap();
        });
        fake
    }

    #[test]
    fn test_analyze_reads_sessions_and_tracks() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        let fake = cd_fake(root.path().join("x"));
        let prompter = ScriptedPrompter::new([]);
        let cd = CdRipper::new(&fake, &prompter, config(&root, &mount)).analyze().unwrap();
        assert_eq!(cd, CdSummary { sessions: 2, tracks: 2 });
        assert_eq!(fake.calls_to("cdparanoia")[0].arg_after("-d"), Some("/dev/sr0"));
    }

    #[test]
    fn test_enhanced_cd_full_pass() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        std::fs::write(mount.path().join("autorun.inf"), b"[autorun]").unwrap();
        let album = root.path().join("CD Rips").join("Band").join("Album");
        let fake = cd_fake(album.clone());
        let prompter = ScriptedPrompter::new([
            Answer::Yes, // proceed
            Answer::Yes, // extract enhanced content
            Answer::No,  // eject
        ]);
        let cfg = RipperConfig {
            permissions: "750".to_string(),
            ..config(&root, &mount)
        };
        let ripper = CdRipper::new(&fake, &prompter, cfg);

        let outcome = ripper.rip_disc().unwrap();
        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode(&album), 0o750);
        assert_eq!(mode(&album.join("01.Intro.flac")), 0o750);
        let enhanced = album.join("Enhanced Content");
        assert_eq!(
            outcome,
            DiscOutcome::Finished {
                rip_dir: Some(album.clone()),
                enhanced_dir: Some(enhanced.clone()),
            }
        );
        assert!(enhanced.join("autorun.inf").is_file());

        let abcde = &fake.calls_to("abcde")[0];
        assert_eq!(abcde.arg_after("-o"), Some("flac"));
        assert_eq!(abcde.cwd.as_deref(), Some(ripper.output_root()));
        assert_eq!(fake.calls_to("umount").len(), 1);
    }

    #[test]
    fn test_standard_cd_skip_data_check() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        fake.respond("cdrdao", &["disk-info"], ok("Toc Type : CD-DA\nSessions : 1\n"));
        let prompter = ScriptedPrompter::new([Answer::Yes, Answer::No, Answer::Yes]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));

        let outcome = ripper.rip_disc().unwrap();
        assert_eq!(outcome, DiscOutcome::Finished { rip_dir: None, enhanced_dir: None });
        assert!(fake.calls_to("mount").is_empty());
        assert_eq!(fake.calls_to("eject").len(), 1);
        assert_eq!(
            prompter.asked()[1],
            "Would you still like to check for additional data content?"
        );
    }

    fn enhanced_only_fake() -> FakeRunner {
        let fake = FakeRunner::new();
        fake.respond("cdrdao", &["disk-info"], ok(DISK_INFO_ENHANCED));
        fake.respond("cdparanoia", &["-Q"], ok_stderr(TOC));
        fake
    }

    #[test]
    fn test_enhanced_falls_back_to_newest_album() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        std::fs::write(mount.path().join("video.txt"), b"x").unwrap();
        let old_album = root.path().join("CD Rips").join("Band").join("Earlier");
        std::fs::create_dir_all(&old_album).unwrap();
        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::open(&old_album).unwrap().set_modified(an_hour_ago).unwrap();

        let fake = enhanced_only_fake();
        let prompter = ScriptedPrompter::new([Answer::Yes, Answer::Yes, Answer::No]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));

        let outcome = ripper.rip_disc().unwrap();
        let enhanced = old_album.join("Enhanced Content");
        assert_eq!(
            outcome,
            DiscOutcome::Finished {
                rip_dir: None,
                enhanced_dir: Some(enhanced.clone()),
            }
        );
        assert!(enhanced.join("video.txt").is_file());
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_enhanced_asks_for_target_when_library_is_empty() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        std::fs::write(mount.path().join("video.txt"), b"x").unwrap();
        let target = root.path().join("Extras");

        let fake = enhanced_only_fake();
        let prompter = ScriptedPrompter::new([
            Answer::Yes,
            Answer::Yes,
            text(target.to_str().unwrap()),
            Answer::No,
        ]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));

        let outcome = ripper.rip_disc().unwrap();
        let enhanced = target.join("Enhanced Content");
        assert_eq!(
            outcome,
            DiscOutcome::Finished {
                rip_dir: None,
                enhanced_dir: Some(enhanced.clone()),
            }
        );
        assert!(enhanced.join("video.txt").is_file());
        assert!(prompter
            .asked()
            .contains(&"Enter the full path to save enhanced content".to_string()));
    }

    #[test]
    fn test_rip_audio_reports_failure() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        fake.respond("abcde", &[], failed(2, ""));
        let prompter = ScriptedPrompter::new([]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));
        assert_eq!(ripper.rip_audio().unwrap(), AudioRip::Failed);
    }

    #[test]
    fn test_abcde_failure_stops_disc() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        fake.respond("abcde", &[], failed(1, ""));
        let prompter = ScriptedPrompter::new([Answer::Yes]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));
        assert_eq!(ripper.rip_disc().unwrap(), DiscOutcome::RipFailed);
        assert!(fake.calls_to("eject").is_empty());
    }

    #[test]
    fn test_waits_for_cd() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        fake.respond_once("cdrdao", &["disk-info"], ok("ERROR: Unit not ready, giving up.\nno disc\n"));
        let prompter = ScriptedPrompter::new([Answer::Enter, Answer::No]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));
        assert_eq!(ripper.rip_disc().unwrap(), DiscOutcome::Cancelled);
        // probe, probe again, then analysis
        assert_eq!(fake.calls_to("cdrdao").len(), 3);
    }

    #[test]
    fn test_run_another_loop() {
        let root = TempDir::new().unwrap();
        let mount = TempDir::new().unwrap();
        let fake = FakeRunner::new();
        let prompter = ScriptedPrompter::new([
            Answer::Yes, Answer::No, Answer::No, Answer::Yes, // disc 1, then "another?"
            Answer::Yes, Answer::No, Answer::No, Answer::No,  // disc 2, stop
        ]);
        let ripper = CdRipper::new(&fake, &prompter, config(&root, &mount));
        ripper.run().unwrap();
        assert_eq!(fake.calls_to("abcde").len(), 2);
        assert_eq!(prompter.remaining(), 0);
    }
}
