//! Title-by-title rip loop shared by the DVD rippers.
//!
//! The binaries supply a closure that rips one title; this module handles
//! mode selection, naming prompts, progress lines and failure accounting.

use crate::errors::{Result, RipError};
use crate::naming;
use crate::prompt::{MenuItem, Prompter};
use crate::title::{self, DiscTitle, Selection};
use crate::ui;
use crate::verify::VerifiedOutput;
use std::path::{Path, PathBuf};

/// stderr shown after a failed title is cut to this many characters.
pub const STDERR_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RipMode {
    /// Every main title, numbered in order.
    Batch,
    /// User-chosen titles and names.
    Selective,
}

/// One title to rip and what to call it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleJob {
    pub title: DiscTitle,
    pub name: String,
    /// 1-based position in this session, used as the file's track number.
    pub track: u32,
}

#[derive(Debug, Default)]
pub struct SessionOutcome {
    pub outputs: Vec<VerifiedOutput>,
    pub failed: Vec<u32>,
}

impl SessionOutcome {
    pub fn any_succeeded(&self) -> bool {
        !self.outputs.is_empty()
    }

    pub fn all_succeeded(&self) -> bool {
        self.any_succeeded() && self.failed.is_empty()
    }
}

/// "Output Settings": artist and album prompts, then `base/artist/album`.
pub fn output_settings(prompter: &dyn Prompter, base: &Path, label: Option<&str>) -> Result<PathBuf> {
    ui::print_header("Output Settings");
    let artist = prompter.input("Enter Artist/Band name", Some("Unknown Artist"))?;
    let default_album = naming::default_album_name(label);
    let album = prompter.input("Enter Album/DVD title", Some(&default_album))?;

    let dir = naming::rip_directory(base, &artist, &album)?;
    ui::print_success(&format!("Output directory: {}", dir.display()));
    Ok(dir)
}

pub fn choose_mode(prompter: &dyn Prompter) -> Result<RipMode> {
    let items = [
        MenuItem::new("Batch Mode", "Rip all titles automatically"),
        MenuItem::new("Selective Mode", "Choose which titles to rip"),
    ];
    let choice = prompter.select("Select ripping mode:", &items, 0)?;
    Ok(if choice == 1 { RipMode::Selective } else { RipMode::Batch })
}

/// Rip the main titles, offering a rename for each before it starts.
pub fn run_batch<F>(prompter: &dyn Prompter, titles: &[DiscTitle], min_secs: u64, mut rip: F) -> Result<SessionOutcome>
where
    F: FnMut(&TitleJob) -> Result<VerifiedOutput>,
{
    ui::print_header("Batch Mode - Ripping All Titles");
    if titles.is_empty() {
        ui::print_error("No titles found on disc");
        return Ok(SessionOutcome::default());
    }

    let main = title::main_titles(titles, min_secs);
    ui::print_info(&format!("Processing {} title(s)...", main.len()));

    let mut outcome = SessionOutcome::default();
    let total = main.len();
    for (i, t) in main.into_iter().enumerate() {
        let track = i as u32 + 1;
        announce(track, total, &t);

        let mut name = naming::default_track_name(track);
        if prompter.confirm(&format!("Rename '{}'?", name))? {
            name = prompter.input("Enter new name", Some(&name))?;
        }
        let job = TitleJob {
            name: naming::sanitize_component(&name, &naming::default_track_name(track)),
            title: t,
            track,
        };
        record(&mut outcome, &job, rip(&job))?;
    }
    Ok(outcome)
}

/// Let the user pick titles and name each one.
pub fn run_selective<F>(prompter: &dyn Prompter, titles: &[DiscTitle], mut rip: F) -> Result<SessionOutcome>
where
    F: FnMut(&TitleJob) -> Result<VerifiedOutput>,
{
    ui::print_header("Selective Mode");
    if titles.is_empty() {
        ui::print_error("No titles found on disc");
        return Ok(SessionOutcome::default());
    }

    println!("\n{}", ui::info().apply_to("Available titles:"));
    for t in titles {
        println!("  {}. Duration: {}", ui::fmt_title_number(t.number), t.duration_label());
    }

    let answer = prompter.input("Enter title numbers to rip (e.g., 1,2,3 or 'all')", Some("all"))?;
    let selected = match title::parse_selection(&answer, titles) {
        Selection::Titles(selected) => selected,
        Selection::Invalid(token) => {
            tracing::warn!(token = %token, "Unparsable title selection");
            ui::print_warning("Invalid selection, processing all titles");
            titles.to_vec()
        }
        Selection::Empty => {
            ui::print_error("No titles selected");
            return Ok(SessionOutcome::default());
        }
    };

    ui::print_info(&format!("Processing {} selected title(s)...", selected.len()));
    let mut outcome = SessionOutcome::default();
    let total = selected.len();
    for (i, t) in selected.into_iter().enumerate() {
        let track = i as u32 + 1;
        announce(track, total, &t);

        let default_name = naming::default_track_name(track);
        let name = prompter.input(&format!("Enter name for title {}", t.number), Some(&default_name))?;
        let job = TitleJob {
            name: naming::sanitize_component(&name, &default_name),
            title: t,
            track,
        };
        record(&mut outcome, &job, rip(&job))?;
    }
    Ok(outcome)
}

fn announce(track: u32, total: usize, t: &DiscTitle) {
    println!();
    ui::print_info(&format!("[{}/{}] Title {} ({})", track, total, t.number, t.duration_label()));
}

/// Book one title's result. Prompt failures abort the session; everything
/// else only fails this title.
fn record(outcome: &mut SessionOutcome, job: &TitleJob, result: Result<VerifiedOutput>) -> Result<()> {
    match result {
        Ok(output) => {
            ui::print_success(&format!("Completed: {} ({})", output.file_name(), output.size_mb()));
            outcome.outputs.push(output);
        }
        Err(e @ (RipError::Prompt(_) | RipError::Cancelled)) => return Err(e),
        Err(e) => {
            tracing::error!(title = job.title.number, error = %e, "Title rip failed");
            ui::print_error(&format!("Failed to rip title {}", job.title.number));
            println!("  Error: {}", error_preview(&e));
            outcome.failed.push(job.title.number);
        }
    }
    Ok(())
}

/// Tool stderr when there is some, else the error itself, cut short.
pub fn error_preview(e: &RipError) -> String {
    let text = match e {
        RipError::ToolFailed { stderr, .. } if !stderr.trim().is_empty() => stderr.trim().to_string(),
        other => other.to_string(),
    };
    text.chars().take(STDERR_PREVIEW_CHARS).collect()
}

/// Closing banner of one disc.
pub fn print_completion(success: bool) {
    ui::print_header("Ripping Complete!");
    if success {
        ui::print_success("All operations completed successfully");
    } else {
        ui::print_warning("Some operations may have failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{text, Answer, ScriptedPrompter};
    use tempfile::TempDir;

    fn titles() -> Vec<DiscTitle> {
        vec![
            DiscTitle { number: 1, duration: Some("00:00:10".into()), chapters: 1 },
            DiscTitle { number: 2, duration: Some("00:04:00".into()), chapters: 3 },
            DiscTitle { number: 3, duration: Some("00:05:30".into()), chapters: 4 },
        ]
    }

    fn fake_output(job: &TitleJob) -> Result<VerifiedOutput> {
        Ok(VerifiedOutput {
            path: PathBuf::from(format!("/rips/{:02} - {}.mp4", job.track, job.name)),
            size_bytes: 1024,
            duration_secs: None,
        })
    }

    #[test]
    fn test_batch_skips_short_titles_and_renames() {
        let prompter = ScriptedPrompter::new([Answer::No, Answer::Yes, text("Encore")]);
        let mut jobs = Vec::new();
        let outcome = run_batch(&prompter, &titles(), 60, |job| {
            jobs.push(job.clone());
            fake_output(job)
        })
        .unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!((jobs[0].title.number, jobs[0].track, jobs[0].name.as_str()), (2, 1, "Track 01"));
        assert_eq!((jobs[1].title.number, jobs[1].track, jobs[1].name.as_str()), (3, 2, "Encore"));
        assert!(outcome.all_succeeded());
    }

    #[test]
    fn test_failed_title_does_not_stop_batch() {
        let prompter = ScriptedPrompter::new([Answer::No, Answer::No]);
        let outcome = run_batch(&prompter, &titles(), 60, |job| {
            if job.title.number == 2 {
                Err(RipError::ToolFailed {
                    tool: "HandBrakeCLI".into(),
                    exit_code: Some(3),
                    stderr: "x".repeat(500),
                })
            } else {
                fake_output(job)
            }
        })
        .unwrap();
        assert_eq!(outcome.failed, vec![2]);
        assert_eq!(outcome.outputs.len(), 1);
        assert!(outcome.any_succeeded() && !outcome.all_succeeded());
    }

    #[test]
    fn test_selective_ranges_and_names() {
        let prompter = ScriptedPrompter::new([text("3,1"), text(""), text("Finale")]);
        let mut jobs = Vec::new();
        run_selective(&prompter, &titles(), |job| {
            jobs.push(job.clone());
            fake_output(job)
        })
        .unwrap();
        let picked: Vec<(u32, &str)> = jobs.iter().map(|j| (j.title.number, j.name.as_str())).collect();
        assert_eq!(picked, vec![(1, "Track 01"), (3, "Finale")]);
    }

    #[test]
    fn test_selective_invalid_falls_back_to_all() {
        let prompter = ScriptedPrompter::new([text("1,two"), text(""), text(""), text("")]);
        let mut count = 0;
        run_selective(&prompter, &titles(), |job| {
            count += 1;
            fake_output(job)
        })
        .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_selective_empty_selection() {
        let prompter = ScriptedPrompter::new([text("9")]);
        let outcome = run_selective(&prompter, &titles(), fake_output).unwrap();
        assert!(!outcome.any_succeeded());
    }

    #[test]
    fn test_output_settings_defaults() {
        let dir = TempDir::new().unwrap();
        let prompter = ScriptedPrompter::new([text(""), text("")]);
        let out = output_settings(&prompter, dir.path(), Some("LIVE AT ROME")).unwrap();
        assert_eq!(out, dir.path().join("Unknown Artist").join("LIVE_AT_ROME"));
        assert!(out.is_dir());
    }

    #[test]
    fn test_error_preview() {
        let long = RipError::ToolFailed { tool: "ffmpeg".into(), exit_code: Some(1), stderr: "e".repeat(300) };
        assert_eq!(error_preview(&long).len(), STDERR_PREVIEW_CHARS);
        let missing = RipError::OutputMissing(PathBuf::from("/x.mp4"));
        assert!(error_preview(&missing).contains("/x.mp4"));
    }
}
