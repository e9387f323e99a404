//! HandBrakeCLI and lsdvd command lines.

use shared_utils::profile::{OutputFormat, QualityPreset};
use shared_utils::ToolCommand;
use std::path::Path;

pub fn lsdvd_probe(device: &str) -> ToolCommand {
    ToolCommand::new("lsdvd").arg(device)
}

pub fn lsdvd_details(device: &str) -> ToolCommand {
    ToolCommand::new("lsdvd").arg("-x").arg(device)
}

/// Scan every title; the summary lands on stderr.
pub fn scan(device: &str) -> ToolCommand {
    ToolCommand::new("HandBrakeCLI").args(["--input", device, "--title", "0", "--scan"])
}

/// Encode one title straight to a video output format.
pub fn encode_title(
    device: &str,
    title: u32,
    output: &Path,
    format: OutputFormat,
    quality: QualityPreset,
) -> ToolCommand {
    let encoder = format.video_encoder().unwrap_or("x264");
    let cmd = ToolCommand::new("HandBrakeCLI")
        .args(["--input", device, "--title"])
        .arg(title.to_string())
        .arg("--output")
        .path_arg(output)
        .args(["--format", format.container().unwrap_or("av_mkv")])
        .args(["--encoder", encoder])
        .arg("--quality")
        .arg(quality.quality().to_string())
        .args(["--encoder-preset", quality.encoder_preset()])
        .args(["--aencoder", format.audio_encoder().unwrap_or("copy")])
        .arg("--ab")
        .arg(quality.audio_bitrate().to_string())
        .args(["--all-audio", "--all-subtitles", "--markers"]);
    if encoder == "x265" {
        cmd.args(["--encoder-tune", "fastdecode"])
    } else {
        cmd
    }
}

/// Fast throwaway MKV with the original audio, for audio-only formats.
pub fn extract_for_audio(device: &str, title: u32, output: &Path) -> ToolCommand {
    ToolCommand::new("HandBrakeCLI")
        .args(["--input", device, "--title"])
        .arg(title.to_string())
        .arg("--output")
        .path_arg(output)
        .args(["--format", "av_mkv", "--encoder", "x264", "--quality", "30"])
        .args(["--encoder-preset", "ultrafast", "--aencoder", "copy"])
}
