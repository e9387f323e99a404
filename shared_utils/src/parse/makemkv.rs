//! `makemkvcon -r` (robot mode) output.
//!
//! Each line is `KIND:field,field,...` with string fields double-quoted.

use crate::title::DiscTitle;
use serde::Serialize;

/// TINFO attribute codes.
const ATTR_CHAPTERS: u32 = 8;
const ATTR_DURATION: u32 = 9;
const ATTR_SIZE: u32 = 10;
const ATTR_OUTPUT_FILE: u32 = 27;
/// CINFO attribute holding the disc name.
const ATTR_NAME: u32 = 2;
/// DRV state for a drive with media loaded.
const DRIVE_HAS_MEDIA: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MakeMkvTitle {
    /// Zero-based index as makemkvcon numbers titles.
    pub index: u32,
    pub duration: Option<String>,
    pub chapters: u32,
    pub size: Option<String>,
    pub output_file_name: Option<String>,
}

impl MakeMkvTitle {
    fn new(index: u32) -> Self {
        Self {
            index,
            duration: None,
            chapters: 0,
            size: None,
            output_file_name: None,
        }
    }

    /// As a [`DiscTitle`], numbered from 1 for display and selection.
    pub fn to_disc_title(&self) -> DiscTitle {
        DiscTitle {
            number: self.index.saturating_add(1),
            duration: self.duration.clone(),
            chapters: self.chapters,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MakeMkvDisc {
    pub label: Option<String>,
    pub titles: Vec<MakeMkvTitle>,
}

impl MakeMkvDisc {
    pub fn disc_titles(&self) -> Vec<DiscTitle> {
        self.titles.iter().map(MakeMkvTitle::to_disc_title).collect()
    }

    /// Title by its 1-based display number.
    pub fn by_number(&self, number: u32) -> Option<&MakeMkvTitle> {
        self.titles.iter().find(|t| t.index.checked_add(1) == Some(number))
    }
}

/// Split the comma-separated fields of one robot line, unquoting strings.
pub fn split_fields(s: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => quoted = !quoted,
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ',' if !quoted => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn record<'a>(line: &'a str, kind: &str) -> Option<&'a str> {
    line.trim().strip_prefix(kind)?.strip_prefix(':')
}

pub fn parse_info(text: &str) -> MakeMkvDisc {
    let mut disc = MakeMkvDisc::default();

    for line in text.lines() {
        if let Some(rest) = record(line, "CINFO") {
            let fields = split_fields(rest);
            if fields.len() >= 3 && fields[0].parse::<u32>().ok() == Some(ATTR_NAME) && !fields[2].is_empty() {
                disc.label = Some(fields[2].clone());
            }
        } else if let Some(rest) = record(line, "TINFO") {
            let fields = split_fields(rest);
            if fields.len() < 4 {
                continue;
            }
            let (Ok(index), Ok(attr)) = (fields[0].parse::<u32>(), fields[1].parse::<u32>()) else {
                continue;
            };
            // Display numbers are index + 1.
            if index == u32::MAX {
                continue;
            }
            let pos = match disc.titles.iter().position(|t| t.index == index) {
                Some(pos) => pos,
                None => {
                    disc.titles.push(MakeMkvTitle::new(index));
                    disc.titles.len() - 1
                }
            };
            let title = &mut disc.titles[pos];
            let value = fields[3].clone();
            match attr {
                ATTR_CHAPTERS => title.chapters = value.parse().unwrap_or(0),
                ATTR_DURATION => title.duration = Some(value),
                ATTR_SIZE => title.size = Some(value),
                ATTR_OUTPUT_FILE => title.output_file_name = Some(value),
                _ => {}
            }
        }
    }

    disc.titles.sort_by_key(|t| t.index);
    disc
}

/// Whether the drive at `device` reports loaded media in a `DRV:` listing.
pub fn drive_has_disc(text: &str, device: &str) -> bool {
    text.lines().filter_map(|l| record(l, "DRV")).any(|rest| {
        let fields = split_fields(rest);
        if fields.len() < 7 || fields[6] != device {
            return false;
        }
        fields[1].parse::<u32>().ok() == Some(DRIVE_HAS_MEDIA) || !fields[5].is_empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: &str = r#"MSG:1005,0,1,"MakeMKV v1.17.7 linux(x64-release) started","%1 started","MakeMKV v1.17.7 linux(x64-release)"
DRV:0,2,999,1,"DVD+R-DL HL-DT-ST DVDRAM GH24NSD1 LG00","CONCERT_2019","/dev/sr0"
DRV:1,256,999,0,"","",""
TCOUNT:2
CINFO:1,6206,"DVD disc"
CINFO:2,0,"CONCERT_2019"
TINFO:0,2,0,"CONCERT_2019"
TINFO:0,8,0,"24"
TINFO:0,9,0,"1:48:02"
TINFO:0,10,0,"5.1 GB"
TINFO:0,27,0,"CONCERT_2019_t00.mkv"
TINFO:1,8,0,"3"
TINFO:1,9,0,"0:12:40"
TINFO:1,27,0,"CONCERT_2019_t01.mkv"
SINFO:0,0,1,6201,"Video"
"#;

    #[test]
    fn test_split_fields() {
        assert_eq!(split_fields(r#"0,2,"a, b","x\"y""#), vec!["0", "2", "a, b", "x\"y"]);
        assert_eq!(split_fields(""), vec![""]);
    }

    #[test]
    fn test_parse_info() {
        let disc = parse_info(INFO);
        assert_eq!(disc.label.as_deref(), Some("CONCERT_2019"));
        assert_eq!(disc.titles.len(), 2);
        assert_eq!(disc.titles[0].chapters, 24);
        assert_eq!(disc.titles[0].duration.as_deref(), Some("1:48:02"));
        assert_eq!(disc.titles[0].size.as_deref(), Some("5.1 GB"));
        assert_eq!(disc.titles[1].output_file_name.as_deref(), Some("CONCERT_2019_t01.mkv"));
        assert_eq!(disc.titles[1].size, None);
    }

    #[test]
    fn test_disc_titles_are_one_based() {
        let disc = parse_info(INFO);
        let numbers: Vec<u32> = disc.disc_titles().iter().map(|t| t.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(disc.by_number(2).map(|t| t.index), Some(1));
        assert_eq!(disc.by_number(3), None);
    }

    #[test]
    fn test_drive_has_disc() {
        assert!(drive_has_disc(INFO, "/dev/sr0"));
        assert!(!drive_has_disc(INFO, "/dev/sr1"));
        let empty = r#"DRV:0,0,999,0,"BD-RE ASUS BW-16D1HT 3.10","","/dev/sr0""#;
        assert!(!drive_has_disc(empty, "/dev/sr0"));
    }

    #[test]
    fn test_out_of_range_index_is_ignored() {
        let text = "TINFO:4294967295,9,0,\"0:10:00\"\nTINFO:4294967294,9,0,\"0:20:00\"\n";
        let disc = parse_info(text);
        assert_eq!(disc.titles.len(), 1);
        assert_eq!(disc.disc_titles()[0].number, u32::MAX);
        assert_eq!(disc.by_number(u32::MAX).map(|t| t.index), Some(u32::MAX - 1));
        assert_eq!(disc.by_number(0), None);
    }
}
