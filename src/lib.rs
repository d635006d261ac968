//! Batch image quality reduction and format conversion
//!
//! Takes a set of uploaded PNG/JPEG images, re-encodes each one either as a
//! lower-quality JPEG or in another format, previews the before/after pairs
//! and packages the results as a single ZIP archive for download.

pub mod app;
pub mod archive;
pub mod download;
pub mod error;
pub mod intake;
pub mod mime;
pub mod models;
pub mod preview;
pub mod transform;

pub use error::{Error, Result};
