//! Data models and structures
//!
//! Defines the transform parameters chosen for a batch, the items produced
//! by the transformer, the archive handed to the download collaborator and
//! the runtime configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Content type attached to every delivered archive.
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// JPEG quality level, always within `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Quality(u8);

impl Quality {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 100;
    /// Default of the original quality slider.
    pub const DEFAULT: Quality = Quality(10);

    pub fn new(level: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(Error::InvalidQuality(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Quality {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        Self::new(level)
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.0
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetFormat {
    Png,
    Jpeg,
}

impl TargetFormat {
    /// Lowercased format tag used as the converted file's extension.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::Png => "png",
            TargetFormat::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetFormat::Png => f.write_str("PNG"),
            TargetFormat::Jpeg => f.write_str("JPEG"),
        }
    }
}

impl FromStr for TargetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(TargetFormat::Png),
            "jpeg" | "jpg" => Ok(TargetFormat::Jpeg),
            _ => Err(Error::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    QualityReduction,
    FormatConversion,
}

impl Workflow {
    /// Fixed name the archive is offered under.
    pub fn archive_file_name(self) -> &'static str {
        match self {
            Workflow::QualityReduction => "imagenes_reducidas.zip",
            Workflow::FormatConversion => "imagenes_convertidas.zip",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Workflow::QualityReduction => f.write_str("quality reduction"),
            Workflow::FormatConversion => f.write_str("format conversion"),
        }
    }
}

/// The transform selected once per invocation and applied to every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TransformParameters {
    QualityReduction { level: Quality },
    FormatConversion { target: TargetFormat },
}

impl TransformParameters {
    pub fn workflow(&self) -> Workflow {
        match self {
            TransformParameters::QualityReduction { .. } => Workflow::QualityReduction,
            TransformParameters::FormatConversion { .. } => Workflow::FormatConversion,
        }
    }

    /// Name the transformed item is archived under.
    ///
    /// Quality reduction keeps the upload's name even though the bytes are now
    /// JPEG. Conversion replaces everything after the final `.` with the
    /// target's extension; a name without a `.` is used whole as the stem.
    pub fn output_name(&self, input_name: &str) -> String {
        match self {
            TransformParameters::QualityReduction { .. } => input_name.to_string(),
            TransformParameters::FormatConversion { target } => {
                let stem = input_name
                    .rsplit_once('.')
                    .map_or(input_name, |(stem, _)| stem);
                format!("{}.{}", stem, target.extension())
            }
        }
    }

    pub fn transformed_caption(&self, output_name: &str) -> String {
        match self {
            TransformParameters::QualityReduction { .. } => {
                format!("Reduced quality image: {}", output_name)
            }
            TransformParameters::FormatConversion { target } => {
                format!("Converted to {}: {}", target, output_name)
            }
        }
    }
}

/// Result of transforming one upload.
#[derive(Debug, Clone)]
pub struct TransformedItem {
    pub name: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// The archive produced once per non-empty batch.
#[derive(Debug, Clone)]
pub struct ArchiveResult {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Entry names as written, in archive order.
    pub entries: Vec<String>,
}

/// How entries that share a name inside one archive are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Later duplicates get a `_N` suffix before their extension.
    #[default]
    Rename,
    /// One entry per name, holding the bytes of the last duplicate.
    Replace,
}

impl FromStr for DuplicatePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rename" => Ok(DuplicatePolicy::Rename),
            "replace" => Ok(DuplicatePolicy::Replace),
            other => Err(Error::Config(format!(
                "Unknown duplicate policy '{}' (expected rename or replace)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryReport {
    pub source_name: String,
    pub entry_name: String,
    pub source_bytes: usize,
    pub output_bytes: usize,
    pub width: u32,
    pub height: u32,
}

/// Summary of one completed batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub workflow: Workflow,
    pub parameters: TransformParameters,
    pub archive_file_name: String,
    pub archive_bytes: usize,
    pub archive_entries: Vec<String>,
    /// Where the download collaborator put the archive.
    pub location: String,
    pub entries: Vec<EntryReport>,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub output_dir: PathBuf,
    pub default_quality: Quality,
    pub duplicate_policy: DuplicatePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // A missing .env is fine, a malformed one is not.
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e.into());
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let output_dir = lookup("IMGBATCH_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("output"));

        let default_quality = match lookup("IMGBATCH_DEFAULT_QUALITY") {
            Some(raw) => {
                let level = raw.trim().parse::<u8>().map_err(|_| {
                    Error::Config(format!("IMGBATCH_DEFAULT_QUALITY is not a number: {}", raw))
                })?;
                Quality::new(level).map_err(|e| Error::Config(e.to_string()))?
            }
            None => Quality::DEFAULT,
        };

        let duplicate_policy = match lookup("IMGBATCH_ON_DUPLICATE") {
            Some(raw) => raw.trim().parse()?,
            None => DuplicatePolicy::default(),
        };

        Ok(Self {
            output_dir,
            default_quality,
            duplicate_policy,
        })
    }
}
