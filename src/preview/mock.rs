use super::{PreviewFrame, PreviewService};
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct MockPreview {
    captions: Arc<Mutex<Vec<(String, String)>>>,
    finish_count: Arc<Mutex<usize>>,
}

impl MockPreview {
    pub fn new() -> Self {
        Self {
            captions: Arc::new(Mutex::new(Vec::new())),
            finish_count: Arc::new(Mutex::new(0)),
        }
    }

    /// `(original, transformed)` caption pairs in the order they were shown.
    pub fn get_captions(&self) -> Vec<(String, String)> {
        self.captions.lock().unwrap().clone()
    }

    pub fn get_show_count(&self) -> usize {
        self.captions.lock().unwrap().len()
    }

    pub fn get_finish_count(&self) -> usize {
        *self.finish_count.lock().unwrap()
    }
}

impl Default for MockPreview {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreviewService for MockPreview {
    async fn show(&self, frame: PreviewFrame<'_>) -> Result<()> {
        self.captions.lock().unwrap().push((
            frame.original_caption.to_string(),
            frame.transformed_caption.to_string(),
        ));
        Ok(())
    }

    async fn finish(&self) -> Result<()> {
        *self.finish_count.lock().unwrap() += 1;
        Ok(())
    }
}
