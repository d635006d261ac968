use super::{PixelMode, TransformService};
use crate::intake::UploadedItem;
use crate::models::{Quality, TargetFormat, TransformParameters, TransformedItem};
use crate::{Error, Result};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use std::borrow::Cow;
use tracing::debug;

/// A decoded upload together with the pixel mode of its container.
pub struct SourceImage {
    pub image: DynamicImage,
    pub mode: PixelMode,
}

impl SourceImage {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        let mode = PixelMode::sniff(bytes).unwrap_or_else(|| PixelMode::from_color(image.color()));
        Ok(Self { image, mode })
    }
}

/// Narrow to a layout the JPEG encoder accepts: 8-bit luma or RGB, alpha dropped.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        _ if !image.color().has_color() => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

/// Re-encode as JPEG at `level`, whatever the source format was.
pub fn reduce_quality(source: &SourceImage, level: Quality) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    jpeg_compatible(&source.image)
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, level.get()))?;
    Ok(buffer)
}

/// Re-encode in `target` with the encoder's default settings.
///
/// CMYK and palette sources are normalized to RGB before a PNG write.
pub fn convert_format(source: &SourceImage, target: TargetFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    match target {
        TargetFormat::Png => {
            let image = if source.mode.needs_rgb_for_png() {
                Cow::Owned(DynamicImage::ImageRgb8(source.image.to_rgb8()))
            } else {
                Cow::Borrowed(&source.image)
            };
            image.write_with_encoder(PngEncoder::new(&mut buffer))?;
        }
        TargetFormat::Jpeg => {
            jpeg_compatible(&source.image).write_with_encoder(JpegEncoder::new(&mut buffer))?;
        }
    }
    Ok(buffer)
}

/// Decodes uploads with the `image` crate and re-encodes them on the
/// blocking pool.
#[derive(Debug, Default)]
pub struct ImageTransformer;

impl ImageTransformer {
    pub fn new() -> Self {
        Self
    }

    fn transform_sync(
        name: &str,
        bytes: &[u8],
        params: TransformParameters,
    ) -> Result<TransformedItem> {
        let source = SourceImage::decode(bytes)?;
        debug!(
            "[{}] Decoded {}x{} image (mode {})",
            name,
            source.image.width(),
            source.image.height(),
            source.mode
        );

        let encoded = match params {
            TransformParameters::QualityReduction { level } => reduce_quality(&source, level)?,
            TransformParameters::FormatConversion { target } => convert_format(&source, target)?,
        };

        Ok(TransformedItem {
            name: params.output_name(name),
            bytes: encoded,
            width: source.image.width(),
            height: source.image.height(),
        })
    }
}

#[async_trait]
impl TransformService for ImageTransformer {
    async fn transform(
        &self,
        item: &UploadedItem,
        params: &TransformParameters,
    ) -> Result<TransformedItem> {
        tokio::task::spawn_blocking({
            let name = item.name().to_string();
            let bytes = item.bytes().to_vec();
            let params = *params;
            move || Self::transform_sync(&name, &bytes, params)
        })
        .await
        .map_err(|e| Error::Invariant(format!("Image transform task join error: {}", e)))?
    }
}
