//! Disc titles, durations and title selection

use serde::Serialize;

/// One title as reported by a scanning tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscTitle {
    pub number: u32,
    pub duration: Option<String>,
    pub chapters: u32,
}

impl DiscTitle {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            duration: None,
            chapters: 0,
        }
    }

    pub fn duration_label(&self) -> &str {
        self.duration.as_deref().unwrap_or("Unknown")
    }

    pub fn duration_secs(&self) -> Option<u64> {
        self.duration.as_deref().and_then(parse_duration_secs)
    }
}

/// Scanned disc: label plus titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscInfo {
    pub label: Option<String>,
    pub titles: Vec<DiscTitle>,
}

impl DiscInfo {
    pub fn label_or_default(&self) -> &str {
        self.label.as_deref().unwrap_or("Unknown DVD")
    }
}

/// `HH:MM:SS`, `H:MM:SS`, `MM:SS`, each with optional fractional seconds.
pub fn parse_duration_secs(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let (secs_part, rest) = parts.split_last()?;
    let secs = secs_part.split('.').next()?.parse::<u64>().ok()?;
    let mut total = secs;
    let mut factor = 60;
    for unit in rest.iter().rev() {
        total = total.checked_add(unit.parse::<u64>().ok()?.checked_mul(factor)?)?;
        factor *= 60;
    }
    Some(total)
}

/// Titles worth ripping in batch mode.
///
/// Titles shorter than `min_secs` are menus and transitions. Titles whose
/// duration is unknown stay in. If the filter would drop everything, all
/// titles are returned.
pub fn main_titles(titles: &[DiscTitle], min_secs: u64) -> Vec<DiscTitle> {
    let kept: Vec<DiscTitle> = titles
        .iter()
        .filter(|t| t.duration_secs().map_or(true, |secs| secs >= min_secs))
        .cloned()
        .collect();
    if kept.is_empty() {
        titles.to_vec()
    } else {
        kept
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Titles(Vec<DiscTitle>),
    /// Well-formed but matched no title.
    Empty,
    /// Could not be parsed at all.
    Invalid(String),
}

/// Parse `all`, or a comma list of numbers and `a-b` ranges.
///
/// Matching titles come back in disc order regardless of input order.
pub fn parse_selection(input: &str, titles: &[DiscTitle]) -> Selection {
    let input = input.trim();
    if input.is_empty() || input.eq_ignore_ascii_case("all") {
        return Selection::Titles(titles.to_vec());
    }

    let mut wanted: Vec<(u32, u32)> = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let range = match token.split_once('-') {
            Some((a, b)) => a.trim().parse::<u32>().ok().zip(b.trim().parse::<u32>().ok()),
            None => token.parse::<u32>().ok().map(|n| (n, n)),
        };
        match range {
            Some((a, b)) if a <= b => wanted.push((a, b)),
            _ => return Selection::Invalid(token.to_string()),
        }
    }

    let selected: Vec<DiscTitle> = titles
        .iter()
        .filter(|t| wanted.iter().any(|(a, b)| (*a..=*b).contains(&t.number)))
        .cloned()
        .collect();

    if selected.is_empty() {
        Selection::Empty
    } else {
        Selection::Titles(selected)
    }
}

/// Lines for the title listing shown after a scan.
pub fn title_listing(titles: &[DiscTitle], limit: usize) -> Vec<String> {
    let mut lines: Vec<String> = titles
        .iter()
        .take(limit)
        .map(|t| {
            if t.chapters > 0 {
                format!("  Title {:2}: {} ({} chapters)", t.number, t.duration_label(), t.chapters)
            } else {
                format!("  Title {:2}: {}", t.number, t.duration_label())
            }
        })
        .collect();
    if titles.len() > limit {
        lines.push(format!("  ... and {} more titles", titles.len() - limit));
    }
    lines
}

pub fn display_titles(titles: &[DiscTitle], limit: usize) {
    for line in title_listing(titles, limit) {
        println!("{}", line);
    }
}
