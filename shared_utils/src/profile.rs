//! Output formats and quality presets offered in the rip menus.

use crate::errors::Result;
use crate::prompt::{MenuItem, Prompter};
use crate::ui;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputFormat {
    Mp4H264,
    MkvH264,
    Mp4Hevc,
    Flac,
    Mp3,
    /// MakeMKV output kept as is.
    Remux,
}

/// Formats every DVD ripper offers, in menu order.
pub const SHARED_FORMATS: [OutputFormat; 5] = [
    OutputFormat::Mp4H264,
    OutputFormat::MkvH264,
    OutputFormat::Mp4Hevc,
    OutputFormat::Flac,
    OutputFormat::Mp3,
];

/// MakeMKV menu: remux first, then the shared formats.
pub const MAKEMKV_FORMATS: [OutputFormat; 6] = [
    OutputFormat::Remux,
    OutputFormat::Mp4H264,
    OutputFormat::MkvH264,
    OutputFormat::Mp4Hevc,
    OutputFormat::Flac,
    OutputFormat::Mp3,
];

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mp4H264 => "MP4 (H.264)",
            Self::MkvH264 => "MKV (H.264)",
            Self::Mp4Hevc => "MP4 (H.265/HEVC)",
            Self::Flac => "Audio Only (FLAC)",
            Self::Mp3 => "Audio Only (MP3)",
            Self::Remux => "MKV (Lossless remux)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Mp4H264 => "Most compatible - works on all devices",
            Self::MkvH264 => "Best for multiple audio/subtitle tracks",
            Self::Mp4Hevc => "Smaller files, modern devices only",
            Self::Flac => "Lossless audio extraction",
            Self::Mp3 => "Compressed audio extraction",
            Self::Remux => "Original streams, no re-encoding",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4H264 | Self::Mp4Hevc => "mp4",
            Self::MkvH264 | Self::Remux => "mkv",
            Self::Flac => "flac",
            Self::Mp3 => "mp3",
        }
    }

    /// HandBrake `--format`.
    pub fn container(&self) -> Option<&'static str> {
        match self {
            Self::Mp4H264 | Self::Mp4Hevc => Some("av_mp4"),
            Self::MkvH264 => Some("av_mkv"),
            _ => None,
        }
    }

    /// HandBrake `--encoder`.
    pub fn video_encoder(&self) -> Option<&'static str> {
        match self {
            Self::Mp4H264 | Self::MkvH264 => Some("x264"),
            Self::Mp4Hevc => Some("x265"),
            _ => None,
        }
    }

    /// HandBrake `--aencoder`.
    pub fn audio_encoder(&self) -> Option<&'static str> {
        match self {
            Self::Mp4H264 | Self::Mp4Hevc => Some("av_aac"),
            Self::MkvH264 | Self::Flac => Some("flac24"),
            Self::Mp3 => Some("mp3"),
            Self::Remux => None,
        }
    }

    pub fn is_audio_only(&self) -> bool {
        matches!(self, Self::Flac | Self::Mp3)
    }

    /// Whether a quality preset changes the result.
    pub fn needs_quality(&self) -> bool {
        self.video_encoder().is_some()
    }

    fn menu_item(&self) -> MenuItem {
        MenuItem::new(self.name(), self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualityPreset {
    High,
    Balanced,
    Fast,
}

pub const QUALITY_PRESETS: [QualityPreset; 3] =
    [QualityPreset::High, QualityPreset::Balanced, QualityPreset::Fast];

impl QualityPreset {
    pub fn name(&self) -> &'static str {
        match self {
            Self::High => "High Quality (Larger files)",
            Self::Balanced => "Balanced (Recommended)",
            Self::Fast => "Fast/Smaller (Lower quality)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::High => "Best quality, larger file size",
            Self::Balanced => "Good quality with reasonable file size",
            Self::Fast => "Faster encoding, smaller files",
        }
    }

    /// Constant quality (`--quality` / `-crf`).
    pub fn quality(&self) -> u8 {
        match self {
            Self::High => 18,
            Self::Balanced => 22,
            Self::Fast => 26,
        }
    }

    pub fn encoder_preset(&self) -> &'static str {
        match self {
            Self::High => "slow",
            Self::Balanced => "medium",
            Self::Fast => "fast",
        }
    }

    /// kbit/s
    pub fn audio_bitrate(&self) -> u32 {
        match self {
            Self::High => 320,
            Self::Balanced => 256,
            Self::Fast => 192,
        }
    }
}

pub fn choose_format(prompter: &dyn Prompter, formats: &[OutputFormat]) -> Result<OutputFormat> {
    ui::print_header("Select Output Format");
    let items: Vec<MenuItem> = formats.iter().map(OutputFormat::menu_item).collect();
    let idx = prompter.select("Choose your preferred output format:", &items, 0)?;
    let format = formats[idx.min(formats.len() - 1)];
    ui::print_success(&format!("Selected: {}", format.name()));
    Ok(format)
}

/// Quality menu, skipped when the format ignores it.
pub fn choose_quality(prompter: &dyn Prompter, format: OutputFormat) -> Result<QualityPreset> {
    if format.is_audio_only() {
        ui::print_info("Audio-only format selected - using best quality");
        return Ok(QualityPreset::High);
    }
    if !format.needs_quality() {
        ui::print_info("Remux selected - streams are copied unchanged");
        return Ok(QualityPreset::High);
    }

    ui::print_header("Select Quality");
    let items: Vec<MenuItem> = QUALITY_PRESETS
        .iter()
        .map(|q| MenuItem::new(q.name(), q.description()))
        .collect();
    let idx = prompter.select("Choose your preferred quality:", &items, 1)?;
    let preset = QUALITY_PRESETS[idx.min(QUALITY_PRESETS.len() - 1)];
    ui::print_success(&format!("Selected: {}", preset.name()));
    Ok(preset)
}
