//! Batch orchestration: transform every upload, preview it, archive the lot.

use crate::archive::package_batch;
use crate::download::{DownloadService, LocalDownload};
use crate::intake::UploadedItem;
use crate::models::{BatchReport, Config, DuplicatePolicy, EntryReport, TransformParameters};
use crate::preview::{HtmlPreview, LogPreview, PreviewFrame, PreviewService};
use crate::transform::{ImageTransformer, TransformService};
use crate::{Error, Result};
use std::path::Path;
use tracing::{error, info};

/// Runs one batch invocation against its collaborators.
pub struct App {
    transformer: Box<dyn TransformService>,
    preview: Box<dyn PreviewService>,
    download: Box<dyn DownloadService>,
    duplicate_policy: DuplicatePolicy,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub transformer: Box<dyn TransformService>,
    pub preview: Box<dyn PreviewService>,
    pub download: Box<dyn DownloadService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, duplicate_policy: DuplicatePolicy) -> Self {
        Self {
            transformer: services.transformer,
            preview: services.preview,
            download: services.download,
            duplicate_policy,
        }
    }

    /// Wire the `image` transformer and a local download directory from
    /// `config`. Previews go to `preview_html` when given, otherwise to the log.
    pub fn new(config: &Config, preview_html: Option<&Path>) -> Self {
        let preview: Box<dyn PreviewService> = match preview_html {
            Some(path) => {
                info!("Previews will be written to {}", path.display());
                Box::new(HtmlPreview::new(path))
            }
            None => Box::new(LogPreview::new()),
        };

        Self::with_services(
            AppServices {
                transformer: Box::new(ImageTransformer::new()),
                preview,
                download: Box::new(LocalDownload::new(&config.output_dir)),
            },
            config.duplicate_policy,
        )
    }

    /// Process `items` in upload order with `params`.
    ///
    /// Returns `None` for an empty upload set: nothing is previewed and no
    /// archive is offered. The first failing item aborts the batch.
    pub async fn run(
        &self,
        items: &[UploadedItem],
        params: &TransformParameters,
    ) -> Result<Option<BatchReport>> {
        let workflow = params.workflow();
        if items.is_empty() {
            info!("No images uploaded, skipping {}", workflow);
            return Ok(None);
        }

        info!("Starting {} of {} image(s)", workflow, items.len());

        let mut pending = Vec::with_capacity(items.len());
        let mut entries = Vec::with_capacity(items.len());

        for item in items {
            let transformed = self
                .transformer
                .transform(item, params)
                .await
                .map_err(|e| {
                    error!("[{}] Transform failed, aborting batch: {}", item.name(), e);
                    e
                })?;
            info!(
                "[{}] Transformed to {} ({} -> {} bytes)",
                item.name(),
                transformed.name,
                item.bytes().len(),
                transformed.bytes.len()
            );

            let original_caption = format!("Original image: {}", item.name());
            let transformed_caption = params.transformed_caption(&transformed.name);
            self.preview
                .show(PreviewFrame {
                    original_caption: &original_caption,
                    original: item.bytes(),
                    transformed_caption: &transformed_caption,
                    transformed: &transformed.bytes,
                })
                .await?;

            entries.push(EntryReport {
                source_name: item.name().to_string(),
                entry_name: transformed.name.clone(),
                source_bytes: item.bytes().len(),
                output_bytes: transformed.bytes.len(),
                width: transformed.width,
                height: transformed.height,
            });
            pending.push((transformed.name, transformed.bytes));
        }

        self.preview.finish().await?;

        let archive = package_batch(workflow, pending, self.duplicate_policy)?
            .ok_or_else(|| Error::Invariant("Non-empty batch produced no archive".to_string()))?;
        info!(
            "Built {} with {} entries ({} bytes)",
            archive.file_name,
            archive.entries.len(),
            archive.bytes.len()
        );

        let location = self
            .download
            .offer(archive.file_name, &archive.bytes, archive.content_type)
            .await?;

        Ok(Some(BatchReport {
            workflow,
            parameters: *params,
            archive_file_name: archive.file_name.to_string(),
            archive_bytes: archive.bytes.len(),
            archive_entries: archive.entries,
            location,
            entries,
        }))
    }
}
