//! Output names and library directories

use crate::errors::Result;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DEFAULT_ALBUM: &str = "DVD_Rip";

/// Album suggestion from a disc label.
pub fn default_album_name(label: Option<&str>) -> String {
    match label.map(str::trim).filter(|l| !l.is_empty()) {
        Some(label) => label.replace(' ', "_").replace('/', "-"),
        None => DEFAULT_ALBUM.to_string(),
    }
}

/// Make a user-supplied name usable as one path component.
pub fn sanitize_component(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\0' { '-' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        fallback.to_string()
    } else {
        cleaned.to_string()
    }
}

/// `NN - name.ext`, or `name.ext` without a track number.
pub fn track_file_name(track: Option<u32>, name: &str, ext: &str) -> String {
    match track {
        Some(n) => format!("{:02} - {}.{}", n, name, ext),
        None => format!("{}.{}", name, ext),
    }
}

pub fn default_track_name(n: u32) -> String {
    format!("Track {:02}", n)
}

/// Strip the junk some enhanced-CD authoring tools leave in video names.
pub fn clean_video_stem(stem: &str) -> String {
    stem.replace('#', "").replace("as Q60D", "").trim().to_string()
}

/// Create and return `base/artist/album`.
pub fn rip_directory(base: &Path, artist: &str, album: &str) -> Result<PathBuf> {
    let dir = base
        .join(sanitize_component(artist, "Unknown Artist"))
        .join(sanitize_component(album, DEFAULT_ALBUM));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Most recently modified `base/*/*` directory, the layout abcde writes.
pub fn latest_rip_directory(base: &Path) -> Option<PathBuf> {
    newest_album_dir(base, |_| true)
}

/// Like [`latest_rip_directory`], but only directories modified at or after
/// `since`.
pub fn rip_directory_since(base: &Path, since: SystemTime) -> Option<PathBuf> {
    newest_album_dir(base, |modified| modified >= since)
}

fn newest_album_dir(base: &Path, keep: impl Fn(SystemTime) -> bool) -> Option<PathBuf> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for artist in std::fs::read_dir(base).ok()?.flatten() {
        if !artist.path().is_dir() {
            continue;
        }
        let Ok(albums) = std::fs::read_dir(artist.path()) else {
            continue;
        };
        for album in albums.flatten() {
            let path = album.path();
            if !path.is_dir() {
                continue;
            }
            let Ok(modified) = album.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if !keep(modified) {
                continue;
            }
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }
    }
    newest.map(|(_, path)| path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_album_name() {
        assert_eq!(default_album_name(Some("LIVE AT/WEMBLEY")), "LIVE_AT-WEMBLEY");
        assert_eq!(default_album_name(Some("  ")), "DVD_Rip");
        assert_eq!(default_album_name(None), "DVD_Rip");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component(" AC/DC ", "x"), "AC-DC");
        assert_eq!(sanitize_component("", "Unknown Artist"), "Unknown Artist");
        assert_eq!(sanitize_component("..", "x"), "x");
        assert_eq!(sanitize_component("Don't Stop", "x"), "Don't Stop");
    }

    #[test]
    fn test_track_file_name() {
        assert_eq!(track_file_name(Some(3), "Intro", "mp4"), "03 - Intro.mp4");
        assert_eq!(track_file_name(Some(12), "Encore", "flac"), "12 - Encore.flac");
        assert_eq!(track_file_name(None, "Concert", "mkv"), "Concert.mkv");
        assert_eq!(default_track_name(7), "Track 07");
    }

    #[test]
    fn test_clean_video_stem() {
        assert_eq!(clean_video_stem("#Video as Q60D "), "Video");
        assert_eq!(clean_video_stem("Making Of"), "Making Of");
    }

    #[test]
    fn test_rip_directory_created() {
        let dir = TempDir::new().unwrap();
        let path = rip_directory(dir.path(), "Queen", "Live/Aid").unwrap();
        assert_eq!(path, dir.path().join("Queen").join("Live-Aid"));
        assert!(path.is_dir());
    }

    #[test]
    fn test_latest_rip_directory() {
        let dir = TempDir::new().unwrap();
        assert_eq!(latest_rip_directory(dir.path()), None);

        let old = dir.path().join("A").join("Old");
        std::fs::create_dir_all(&old).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        let new = dir.path().join("B").join("New");
        std::fs::create_dir_all(&new).unwrap();
        std::fs::write(dir.path().join("stray.txt"), b"x").unwrap();

        assert_eq!(latest_rip_directory(dir.path()), Some(new));
        assert_eq!(latest_rip_directory(&dir.path().join("missing")), None);
    }

    #[test]
    fn test_rip_directory_since_skips_older_albums() {
        let dir = TempDir::new().unwrap();
        let old = dir.path().join("A").join("Old");
        std::fs::create_dir_all(&old).unwrap();
        let an_hour_ago = SystemTime::now() - Duration::from_secs(3600);
        std::fs::File::open(&old).unwrap().set_modified(an_hour_ago).unwrap();

        let cutoff = SystemTime::now() - Duration::from_secs(60);
        assert_eq!(rip_directory_since(dir.path(), cutoff), None);
        assert_eq!(latest_rip_directory(dir.path()), Some(old));

        let new = dir.path().join("B").join("New");
        std::fs::create_dir_all(&new).unwrap();
        assert_eq!(rip_directory_since(dir.path(), cutoff), Some(new));
    }
}
