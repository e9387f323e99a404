//! ffmpeg command lines for the conversion steps.

use crate::profile::{OutputFormat, QualityPreset};
use crate::runner::ToolCommand;
use std::path::Path;

/// Enhanced-CD video to a high quality H.264 MP4.
pub fn video_to_mp4(input: &Path, output: &Path) -> ToolCommand {
    ToolCommand::new("ffmpeg")
        .arg("-i")
        .path_arg(input)
        .args(["-c:v", "libx264", "-crf", "15", "-preset", "slow"])
        .args(["-c:a", "aac", "-b:a", "256k"])
        .path_arg(output)
}

/// Audio track of `input` as FLAC, or MP3 at the preset's bitrate.
pub fn extract_audio(input: &Path, output: &Path, format: OutputFormat, quality: QualityPreset) -> ToolCommand {
    let cmd = ToolCommand::new("ffmpeg").arg("-y").arg("-i").path_arg(input).arg("-vn");
    let cmd = match format {
        OutputFormat::Mp3 => cmd
            .args(["-acodec", "libmp3lame", "-ab"])
            .arg(format!("{}k", quality.audio_bitrate())),
        _ => cmd.args(["-acodec", "flac"]),
    };
    cmd.path_arg(output)
}

/// Re-encode a ripped MKV into a video output format.
pub fn transcode_video(input: &Path, output: &Path, format: OutputFormat, quality: QualityPreset) -> ToolCommand {
    let mut cmd = ToolCommand::new("ffmpeg").arg("-y").arg("-i").path_arg(input);

    let mkv = format.extension() == "mkv";
    cmd = if mkv {
        cmd.args(["-map", "0"])
    } else {
        cmd.args(["-map", "0:v", "-map", "0:a"])
    };

    cmd = match format.video_encoder() {
        Some("x265") => cmd.args(["-c:v", "libx265"]),
        _ => cmd.args(["-c:v", "libx264"]),
    };
    cmd = cmd
        .arg("-crf")
        .arg(quality.quality().to_string())
        .arg("-preset")
        .arg(quality.encoder_preset());
    if format.video_encoder() == Some("x265") {
        cmd = cmd.args(["-tag:v", "hvc1"]);
    }

    cmd = match format.audio_encoder() {
        Some("av_aac") => cmd
            .args(["-c:a", "aac", "-b:a"])
            .arg(format!("{}k", quality.audio_bitrate())),
        _ => cmd.args(["-c:a", "flac"]),
    };
    if mkv {
        cmd = cmd.args(["-c:s", "copy"]);
    }
    cmd.path_arg(output)
}
