//! Shared utilities for the disc-rip tools
//!
//! This crate holds everything the `cd-rip`, `dvd-rip` and `mkv-rip` binaries
//! have in common:
//! - External command execution behind a mockable runner
//! - Dependency checks and drive handling
//! - Scrapers for cdrdao, cdparanoia, lsdvd, HandBrake and MakeMKV output
//! - Output profiles, naming, permission fixing, mounting
//! - ffmpeg command construction, output verification, rip summaries
//! - Logging, configuration, prompts and terminal styling

pub mod config;
pub mod deps;
pub mod drive;
pub mod encode;
pub mod errors;
pub mod logging;
pub mod mount;
pub mod naming;
pub mod parse;
pub mod path_safety;
pub mod permissions;
pub mod profile;
pub mod prompt;
pub mod runner;
pub mod session;
pub mod summary;
pub mod title;
pub mod ui;
pub mod verify;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::RipperConfig;
pub use errors::{Result, RipError};
pub use logging::{init_logging, LogConfig};
pub use profile::{OutputFormat, QualityPreset};
pub use prompt::{DialoguerPrompter, MenuItem, Prompter};
pub use runner::{CommandRunner, SystemRunner, ToolCommand, ToolOutput, ToolStatus};
pub use title::{DiscInfo, DiscTitle, Selection};
