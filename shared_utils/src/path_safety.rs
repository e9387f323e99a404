use std::borrow::Cow;
use std::path::Path;

/// Path argument for tools that have no `--` terminator (ffmpeg, HandBrakeCLI).
///
/// A relative path starting with '-' gets a `./` prefix so it cannot be
/// parsed as an option.
pub fn safe_path_arg(path: &Path) -> Cow<'_, str> {
    let s = path.to_string_lossy();
    if s.starts_with('-') {
        Cow::Owned(format!("./{}", s))
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_path_arg() {
        assert_eq!(safe_path_arg(Path::new("Intro.vob")), "Intro.vob");
        assert_eq!(safe_path_arg(Path::new("/rips/Band/01 - Intro.mp4")), "/rips/Band/01 - Intro.mp4");
        assert_eq!(safe_path_arg(Path::new("-live-.mov")), "./-live-.mov");
        assert_eq!(safe_path_arg(Path::new("-extras/clip.avi")), "./-extras/clip.avi");
    }
}
