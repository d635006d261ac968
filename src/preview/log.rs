use super::{PreviewFrame, PreviewService};
use crate::mime::detect_image_mime;
use crate::Result;
use async_trait::async_trait;
use tracing::info;

/// Reports each frame through `tracing` instead of rendering it.
#[derive(Debug, Default)]
pub struct LogPreview;

impl LogPreview {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PreviewService for LogPreview {
    async fn show(&self, frame: PreviewFrame<'_>) -> Result<()> {
        info!(
            "{} ({}, {} bytes)",
            frame.original_caption,
            detect_image_mime(frame.original),
            frame.original.len()
        );
        info!(
            "{} ({}, {} bytes)",
            frame.transformed_caption,
            detect_image_mime(frame.transformed),
            frame.transformed.len()
        );
        Ok(())
    }
}
