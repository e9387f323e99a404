//! mkv-rip - interactive DVD/Blu-ray ripper on top of MakeMKV
//!
//! Titles are pulled off the disc with `makemkvcon` in robot mode, then
//! kept as lossless MKV or converted with ffmpeg.

pub mod makemkv;
pub mod workflow;

pub use workflow::{DiscOutcome, MkvRipper, PROGRAM, REQUIREMENTS};
