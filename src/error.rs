//! Error handling and custom error types
//!
//! Provides unified error handling across the batch workflow using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Quality level {0} is out of range (expected 1-100)")]
    InvalidQuality(u8),

    #[error("Unsupported target format '{0}' (expected PNG or JPEG)")]
    InvalidFormat(String),

    #[error("Unsupported file '{0}' (accepted extensions: jpg, jpeg, png)")]
    UnsupportedExtension(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
