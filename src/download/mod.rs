//! Archive delivery
//!
//! Hands the finished archive to the user under its fixed file name and
//! content type.

pub mod local;
pub mod mock;

pub use local::LocalDownload;
pub use mock::MockDownload;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DownloadService: Send + Sync {
    /// Expose `data` as `file_name`; returns where it can be fetched from.
    async fn offer(&self, file_name: &str, data: &[u8], content_type: &str) -> Result<String>;
}
