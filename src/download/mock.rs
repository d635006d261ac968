use super::DownloadService;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const BASE_URL: &str = "memory://downloads";

#[derive(Clone)]
pub struct MockDownload {
    files: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    offer_count: Arc<Mutex<usize>>,
}

impl MockDownload {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            offer_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_offer_count(&self) -> usize {
        *self.offer_count.lock().unwrap()
    }

    /// Bytes and content type offered under `file_name`.
    pub fn get_file(&self, file_name: &str) -> Option<(Vec<u8>, String)> {
        self.files.lock().unwrap().get(file_name).cloned()
    }
}

impl Default for MockDownload {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DownloadService for MockDownload {
    async fn offer(&self, file_name: &str, data: &[u8], content_type: &str) -> Result<String> {
        *self.offer_count.lock().unwrap() += 1;

        self.files.lock().unwrap().insert(
            file_name.to_string(),
            (data.to_vec(), content_type.to_string()),
        );
        Ok(format!("{}/{}", BASE_URL, file_name))
    }
}
