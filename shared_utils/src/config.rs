//! Ripper configuration
//!
//! Loaded from `~/.config/disc-rip/config.toml` (or `--config`), then
//! overridden by command-line flags.

use crate::errors::{Result, RipError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "disc-rip";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RipperConfig {
    /// Optical drive device node.
    pub device: String,
    /// Root of the audio CD library (`Artist/Album/...` below it).
    pub cd_output_dir: PathBuf,
    /// Root of the DVD library.
    pub dvd_output_dir: PathBuf,
    /// Where the data session of an enhanced CD is mounted.
    pub mount_point: PathBuf,
    /// Batch mode skips titles shorter than this.
    pub min_title_secs: u64,
    /// Titles listed after a scan before "... and N more".
    pub max_listed_titles: usize,
    /// Octal mode applied to everything a rip produces.
    pub permissions: String,
    /// Output type passed to `abcde -o`.
    pub abcde_format: String,
}

fn library_dir(base: Option<PathBuf>, name: &str) -> PathBuf {
    base.or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(name)
}

impl Default for RipperConfig {
    fn default() -> Self {
        Self {
            device: "/dev/sr0".to_string(),
            cd_output_dir: library_dir(dirs::audio_dir(), "CD Rips"),
            dvd_output_dir: library_dir(dirs::video_dir(), "DVD Rips"),
            mount_point: PathBuf::from("/mnt/cdrom-data"),
            min_title_secs: 60,
            max_listed_titles: 15,
            permissions: "777".to_string(),
            abcde_format: "flac".to_string(),
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(CONFIG_DIR_NAME))
        .ok_or_else(|| RipError::Config("Failed to determine config directory".to_string()))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

impl RipperConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RipError::Config(format!(
                "Config file not found at {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Explicit path: must exist. No path: the default location if present,
    /// built-in defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match default_config_path() {
                Ok(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.device.trim().is_empty() {
            return Err(RipError::Config("device must not be empty".to_string()));
        }
        self.file_mode()?;
        Ok(())
    }

    /// `permissions` parsed as an octal mode.
    pub fn file_mode(&self) -> Result<u32> {
        let mode = u32::from_str_radix(self.permissions.trim(), 8).map_err(|_| {
            RipError::Config(format!("permissions must be octal, got {:?}", self.permissions))
        })?;
        if mode > 0o7777 {
            return Err(RipError::Config(format!("permissions out of range: {:o}", mode)));
        }
        Ok(mode)
    }

    pub fn with_device(mut self, device: Option<String>) -> Self {
        if let Some(device) = device {
            self.device = device;
        }
        self
    }

    pub fn with_cd_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.cd_output_dir = dir;
        }
        self
    }

    pub fn with_dvd_output_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.dvd_output_dir = dir;
        }
        self
    }
}
