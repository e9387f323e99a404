//! `cdparanoia -Q` table of contents (printed on stderr).

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static TRACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d+)\.\s+(\d+)\s+\[([\d:.]+)\]").expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioTrack {
    pub number: u32,
    pub sectors: u64,
    /// `MM:SS.ff` as printed by cdparanoia.
    pub length: String,
}

pub fn parse_toc(text: &str) -> Vec<AudioTrack> {
    TRACK
        .captures_iter(text)
        .filter_map(|c| {
            Some(AudioTrack {
                number: c[1].parse().ok()?,
                sectors: c[2].parse().ok()?,
                length: c[3].to_string(),
            })
        })
        .collect()
}
