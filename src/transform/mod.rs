//! Image re-encoding
//!
//! Applies the batch's [`TransformParameters`] to one upload: either a
//! quality-reduction JPEG re-encode or a conversion to PNG/JPEG.

pub mod mock;
pub mod mode;
pub mod processor;

pub use mock::MockTransformer;
pub use mode::PixelMode;
pub use processor::{convert_format, reduce_quality, ImageTransformer, SourceImage};

use crate::intake::UploadedItem;
use crate::models::{TransformParameters, TransformedItem};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TransformService: Send + Sync {
    async fn transform(
        &self,
        item: &UploadedItem,
        params: &TransformParameters,
    ) -> Result<TransformedItem>;
}
