//! `cdrdao disk-info` output.

use regex::Regex;
use std::sync::LazyLock;

static SESSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Sessions\s*:\s*(\d+)").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdStatus {
    pub has_disc: bool,
    /// Number of sessions; more than one means an enhanced CD.
    pub sessions: u32,
}

pub fn parse_disk_info(text: &str) -> CdStatus {
    let has_disc = !text.to_lowercase().contains("no disc");
    let sessions = SESSIONS
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);
    CdStatus { has_disc, sessions }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENHANCED: &str = "\
That data below may not reflect the real status of the inserted medium
if a simulation run was performed before. Reload the medium in this case.

CD-RW                : no
Total Capacity       : n/a
CD-R medium          : n/a
Recording Speed      : n/a
CD-R empty           : no
Toc Type             : CD-DA or CD-ROM
Sessions             : 2
Last Track           : 14
Appendable           : no
";

    #[test]
    fn test_enhanced_cd_sessions() {
        let status = parse_disk_info(ENHANCED);
        assert!(status.has_disc);
        assert_eq!(status.sessions, 2);
    }

    #[test]
    fn test_no_disc() {
        let status = parse_disk_info("ERROR: Unit not ready, giving up.\nNo disc in drive\n");
        assert!(!status.has_disc);
        assert_eq!(status.sessions, 1);
    }

    #[test]
    fn test_missing_sessions_defaults_to_one() {
        assert_eq!(parse_disk_info("Toc Type : CD-DA\nSessions : ?\n").sessions, 1);
    }
}
