//! cd-rip - interactive audio CD ripper
//!
//! Rips audio with abcde and, for enhanced CDs, mounts the data session,
//! copies its content next to the album and converts old video formats to
//! MP4.

pub mod enhanced;
pub mod workflow;

pub use workflow::{CdRipper, DiscOutcome, PROGRAM, REQUIREMENTS};
