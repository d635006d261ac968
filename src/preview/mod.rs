//! Before/after previews
//!
//! Shows each original next to its transformed version. Previews are
//! observational only and never feed back into the archive.

pub mod html;
pub mod log;
pub mod mock;

pub use html::HtmlPreview;
pub use log::LogPreview;
pub use mock::MockPreview;

use crate::Result;
use async_trait::async_trait;

/// One original/transformed pair, captioned.
#[derive(Debug, Clone, Copy)]
pub struct PreviewFrame<'a> {
    pub original_caption: &'a str,
    pub original: &'a [u8],
    pub transformed_caption: &'a str,
    pub transformed: &'a [u8],
}

#[async_trait]
pub trait PreviewService: Send + Sync {
    async fn show(&self, frame: PreviewFrame<'_>) -> Result<()>;

    /// Called once after the last frame of a non-empty batch.
    async fn finish(&self) -> Result<()> {
        Ok(())
    }
}
