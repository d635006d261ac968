//! Upload intake
//!
//! Turns named byte blobs (or files on disk) into [`UploadedItem`]s,
//! enforcing the jpg/jpeg/png allow-list the upload form applied.

use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Extensions an upload may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadExtension {
    Jpg,
    Jpeg,
    Png,
}

impl UploadExtension {
    /// Parse the final `.` segment of `name`, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "jpg" => Some(UploadExtension::Jpg),
            "jpeg" => Some(UploadExtension::Jpeg),
            "png" => Some(UploadExtension::Png),
            _ => None,
        }
    }
}

/// One uploaded image. Immutable once accepted.
#[derive(Debug, Clone)]
pub struct UploadedItem {
    name: String,
    bytes: Vec<u8>,
    declared_extension: UploadExtension,
}

impl UploadedItem {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let name = name.into();
        let declared_extension = UploadExtension::from_name(&name)
            .ok_or_else(|| Error::UnsupportedExtension(name.clone()))?;

        Ok(Self {
            name,
            bytes,
            declared_extension,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn declared_extension(&self) -> UploadExtension {
        self.declared_extension
    }
}

/// Read each path into an [`UploadedItem`] named after its file name.
///
/// Items keep argument order. The first unreadable or disallowed file aborts
/// the whole intake.
pub fn load_uploads<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<UploadedItem>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let name = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| Error::UnsupportedExtension(path.display().to_string()))?;

            // Reject by name before reading the file
            UploadExtension::from_name(name)
                .ok_or_else(|| Error::UnsupportedExtension(name.to_string()))?;

            let bytes = fs::read(path)?;
            debug!("Loaded upload {} ({} bytes)", name, bytes.len());
            UploadedItem::new(name, bytes)
        })
        .collect()
}
