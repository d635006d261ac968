use super::TransformService;
use crate::intake::UploadedItem;
use crate::models::{TransformParameters, TransformedItem};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Echoes upload bytes back under the derived name without decoding.
#[derive(Clone)]
pub struct MockTransformer {
    transform_count: Arc<Mutex<usize>>,
    fail_on: Arc<Mutex<Option<String>>>,
    dimensions: (u32, u32),
}

impl MockTransformer {
    pub fn new() -> Self {
        Self {
            transform_count: Arc::new(Mutex::new(0)),
            fail_on: Arc::new(Mutex::new(None)),
            dimensions: (1, 1),
        }
    }

    /// Fail when the upload with this name is transformed.
    pub fn with_failure_on(self, name: &str) -> Self {
        *self.fail_on.lock().unwrap() = Some(name.to_string());
        self
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = (width, height);
        self
    }

    pub fn get_transform_count(&self) -> usize {
        *self.transform_count.lock().unwrap()
    }
}

impl Default for MockTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransformService for MockTransformer {
    async fn transform(
        &self,
        item: &UploadedItem,
        params: &TransformParameters,
    ) -> Result<TransformedItem> {
        *self.transform_count.lock().unwrap() += 1;

        if self.fail_on.lock().unwrap().as_deref() == Some(item.name()) {
            return Err(crate::Error::Image(image::ImageError::IoError(
                std::io::Error::other("Mock failure"),
            )));
        }

        Ok(TransformedItem {
            name: params.output_name(item.name()),
            bytes: item.bytes().to_vec(),
            width: self.dimensions.0,
            height: self.dimensions.1,
        })
    }
}
