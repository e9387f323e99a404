//! dvd-rip - interactive music DVD ripper
//!
//! Scans a DVD with lsdvd and HandBrakeCLI, asks for an output profile and
//! names, then rips titles with HandBrake (and ffmpeg for audio-only
//! formats) into `<library>/<artist>/<album>`.

pub mod handbrake;
pub mod workflow;

pub use workflow::{DiscOutcome, DvdRipper, PROGRAM, REQUIREMENTS};
