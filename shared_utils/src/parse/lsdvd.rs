//! `lsdvd` / `lsdvd -x` output.

use crate::title::{DiscInfo, DiscTitle};
use regex::Regex;
use std::sync::LazyLock;

static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Title:\s*(\d+)").expect("valid regex"));
static LENGTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Length:\s*([\d:.]+)").expect("valid regex"));
static CHAPTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Chapters:\s*(\d+)").expect("valid regex"));

/// lsdvd exits 0 on some drives even when it cannot read the disc.
pub fn is_unreadable(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("cannot open") || lower.contains("no such file")
}

pub fn parse(text: &str) -> DiscInfo {
    let mut info = DiscInfo::default();

    for line in text.lines() {
        let trimmed = line.trim();
        if let Some((_, label)) = trimmed.split_once("Disc Title:") {
            let label = label.trim();
            if !label.is_empty() {
                info.label = Some(label.to_string());
            }
        } else if trimmed.starts_with("Title:") {
            let Some(number) = TITLE.captures(trimmed).and_then(|c| c[1].parse::<u32>().ok()) else {
                continue;
            };
            info.titles.push(DiscTitle {
                number,
                duration: LENGTH.captures(trimmed).map(|c| c[1].to_string()),
                chapters: CHAPTERS
                    .captures(trimmed)
                    .and_then(|c| c[1].parse().ok())
                    .unwrap_or(0),
            });
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSDVD_X: &str = "\
libdvdread: Using libdvdcss version 1.4.3 for DVD access
Disc Title: LIVE_AT_WEMBLEY
Title: 01, Length: 01:32:54.000 Chapters: 28, Cells: 29, Audio streams: 02, Subpictures: 04
\tVTS: 01, TTN: 01, FPS: 29.97, Format: NTSC, Aspect ratio: 16/9, Width: 720, Height: 480, DF: Letterbox
\tAudio: 1, Language: en - English, Format: ac3, Frequency: 48000, Quantization: drc, Channels: 6
\tChapter: 01, Length: 00:05:21.100, Start Cell: 01
Title: 02, Length: 00:00:12.500 Chapters: 01, Cells: 01, Audio streams: 01, Subpictures: 00
Title: 03, Length: 00:04:10.233 Chapters: 02, Cells: 02, Audio streams: 01, Subpictures: 00
Longest track: 01
";

    #[test]
    fn test_parse_titles_and_label() {
        let info = parse(LSDVD_X);
        assert_eq!(info.label.as_deref(), Some("LIVE_AT_WEMBLEY"));
        assert_eq!(info.titles.len(), 3);
        assert_eq!(
            info.titles[0],
            DiscTitle {
                number: 1,
                duration: Some("01:32:54.000".to_string()),
                chapters: 28
            }
        );
        assert_eq!(info.titles[1].chapters, 1);
    }

    #[test]
    fn test_chapter_lines_are_not_titles() {
        let info = parse("\tChapter: 01, Length: 00:05:21.100, Start Cell: 01\n");
        assert!(info.titles.is_empty());
        assert_eq!(info.label_or_default(), "Unknown DVD");
    }

    #[test]
    fn test_unreadable() {
        assert!(is_unreadable("libdvdread: Can't open /dev/sr0 for reading\nCan't open disc /dev/sr0!\nlsdvd: Cannot open specified device /dev/sr0 - check your DVD device\n"));
        assert!(!is_unreadable(LSDVD_X));
    }
}
