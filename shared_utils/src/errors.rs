use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RipError {
    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed (exit code: {exit_code:?}): {stderr}")]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("No media in drive: {0}")]
    NoMedia(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mount failed: {0}")]
    Mount(String),

    #[error("Expected output was not produced: {}", .0.display())]
    OutputMissing(PathBuf),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for RipError {
    fn from(e: dialoguer::Error) -> Self {
        RipError::Prompt(e.to_string())
    }
}

impl From<toml::de::Error> for RipError {
    fn from(e: toml::de::Error) -> Self {
        RipError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for RipError {
    fn from(e: toml::ser::Error) -> Self {
        RipError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RipError>;
