//! Scrapers for third-party tool output.
//!
//! Each parser is tolerant: unknown lines are ignored and missing fields fall
//! back to defaults, because the text formats drift between tool versions.

pub mod cdparanoia;
pub mod cdrdao;
pub mod handbrake;
pub mod lsdvd;
pub mod makemkv;
