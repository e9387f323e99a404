//! `HandBrakeCLI --scan` title summary.
//!
//! The summary is a `+`-indented tree on stderr:
//!
//! ```text
//! + title 1:
//!   + duration: 01:32:54
//!   + chapters:
//!     + 1: duration 00:05:21
//!   + audio tracks:
//! ```

use crate::title::DiscTitle;
use regex::Regex;
use std::sync::LazyLock;

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+\s*title\s+(\d+):").expect("valid regex"));
static DURATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+\s*duration:\s*([\d:]+)").expect("valid regex"));
static SECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\+\s*([a-z ]+):\s*$").expect("valid regex"));
static ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\+\s*\d+:").expect("valid regex"));

pub fn parse_scan(text: &str) -> Vec<DiscTitle> {
    let mut titles: Vec<DiscTitle> = Vec::new();
    let mut in_chapters = false;

    for line in text.lines() {
        if let Some(c) = TITLE.captures(line) {
            if let Ok(number) = c[1].parse::<u32>() {
                titles.push(DiscTitle::new(number));
            }
            in_chapters = false;
            continue;
        }
        let Some(current) = titles.last_mut() else {
            continue;
        };

        if let Some(c) = DURATION.captures(line) {
            current.duration = Some(c[1].to_string());
        } else if let Some(c) = SECTION.captures(line) {
            in_chapters = c[1].trim().eq_ignore_ascii_case("chapters");
        } else if in_chapters && ENTRY.is_match(line) {
            current.chapters += 1;
        }
    }

    titles
}
