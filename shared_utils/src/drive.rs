//! Optical drive state

use crate::errors::Result;
use crate::prompt::Prompter;
use crate::runner::{CommandRunner, ToolCommand};
use crate::ui;

/// Probe until media is found, asking the user to insert a disc in between.
///
/// `kind` names the media in messages ("CD", "DVD"). Returns the number of
/// times the user was asked.
pub fn wait_for_media<F>(prompter: &dyn Prompter, kind: &str, mut probe: F) -> Result<u32>
where
    F: FnMut() -> Result<bool>,
{
    let mut waits = 0;
    loop {
        if probe()? {
            ui::print_success(&format!("{} detected", kind));
            return Ok(waits);
        }
        ui::print_warning(&format!("No {} detected in drive", kind));
        tracing::info!(kind, attempt = waits + 1, "Waiting for media");
        prompter.pause(&format!("Please insert a {} and press Enter...", kind))?;
        waits += 1;
    }
}

/// Eject the tray. Failure is reported, not fatal.
pub fn eject(runner: &dyn CommandRunner, device: &str) -> Result<bool> {
    let out = runner.capture(&ToolCommand::new("eject").arg(device))?;
    if out.success() {
        ui::print_success("Disc ejected");
    } else {
        tracing::warn!(device, stderr = %out.stderr.trim(), "eject failed");
        ui::print_warning(&format!("Could not eject {}", device));
    }
    Ok(out.success())
}

/// "Would you like to eject the <kind>?"
pub fn offer_eject(runner: &dyn CommandRunner, prompter: &dyn Prompter, device: &str, kind: &str) -> Result<()> {
    if prompter.confirm(&format!("Would you like to eject the {}?", kind))? {
        ui::print_info(&format!("Ejecting {}...", kind));
        eject(runner, device)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{failed, Answer, FakeRunner, ScriptedPrompter};

    #[test]
    fn test_wait_loops_until_probe_succeeds() {
        let prompter = ScriptedPrompter::new([Answer::Enter, Answer::Enter]);
        let mut results = vec![true, false, false].into_iter().rev();
        let waits = wait_for_media(&prompter, "DVD", || Ok(results.next().unwrap_or(true))).unwrap();
        assert_eq!(waits, 2);
        assert_eq!(prompter.remaining(), 0);
        assert_eq!(prompter.asked()[0], "Please insert a DVD and press Enter...");
    }

    #[test]
    fn test_wait_no_prompt_when_present() {
        let prompter = ScriptedPrompter::new([]);
        assert_eq!(wait_for_media(&prompter, "CD", || Ok(true)).unwrap(), 0);
    }

    #[test]
    fn test_eject() {
        let fake = FakeRunner::new();
        assert!(eject(&fake, "/dev/sr0").unwrap());
        assert_eq!(fake.calls_to("eject")[0].args, vec!["/dev/sr0"]);

        fake.respond("eject", &[], failed(1, "eject: unable to open /dev/sr9"));
        assert!(!eject(&fake, "/dev/sr9").unwrap());
    }

    #[test]
    fn test_offer_eject_declined() {
        let fake = FakeRunner::new();
        let prompter = ScriptedPrompter::new([Answer::No]);
        offer_eject(&fake, &prompter, "/dev/sr0", "CD").unwrap();
        assert!(fake.calls().is_empty());
        assert_eq!(prompter.asked(), vec!["Would you like to eject the CD?"]);
    }
}
