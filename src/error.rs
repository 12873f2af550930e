use crate::formats::OutputFormat;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinikyuError {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Conversion to {0} is not supported by this build")]
    ConversionUnsupported(OutputFormat),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Processing cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),
}

impl MinikyuError {
    pub(crate) fn invalid_quality(quality: u8) -> Self {
        MinikyuError::Validation(format!(
            "quality {} is out of range. Must be between 1 and 100",
            quality
        ))
    }
}

pub type Result<T> = std::result::Result<T, MinikyuError>;
