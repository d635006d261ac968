use super::DownloadService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes offered files into a local directory.
pub struct LocalDownload {
    output_dir: PathBuf,
}

impl LocalDownload {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
        }
    }
}

#[async_trait]
impl DownloadService for LocalDownload {
    async fn offer(&self, file_name: &str, data: &[u8], content_type: &str) -> Result<String> {
        // Only bare file names; nothing may land outside output_dir.
        if Path::new(file_name).file_name().and_then(|name| name.to_str()) != Some(file_name) {
            return Err(Error::Invariant(format!(
                "Download name must be a bare file name: {}",
                file_name
            )));
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_dir.join(file_name);
        tokio::fs::write(&path, data).await?;

        info!(
            "Archive ready for download at {} ({}, {} bytes)",
            path.display(),
            content_type,
            data.len()
        );
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_local_download_writes_file() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("archives");
        let download = LocalDownload::new(&output_dir);

        let location = download
            .offer("imagenes_convertidas.zip", b"PK", "application/zip")
            .await
            .unwrap();

        let path = output_dir.join("imagenes_convertidas.zip");
        assert_eq!(location, path.display().to_string());
        assert_eq!(std::fs::read(&path).unwrap(), b"PK");
    }

    #[tokio::test]
    async fn test_local_download_overwrites_previous_archive() {
        let dir = tempdir().unwrap();
        let download = LocalDownload::new(dir.path());

        download
            .offer("imagenes_reducidas.zip", b"old", "application/zip")
            .await
            .unwrap();
        download
            .offer("imagenes_reducidas.zip", b"new", "application/zip")
            .await
            .unwrap();

        let content = std::fs::read(dir.path().join("imagenes_reducidas.zip")).unwrap();
        assert_eq!(content, b"new");
    }

    #[tokio::test]
    async fn test_local_download_rejects_paths() {
        let dir = tempdir().unwrap();
        let download = LocalDownload::new(dir.path());

        let result = download
            .offer("../escape.zip", b"PK", "application/zip")
            .await;
        assert!(matches!(result, Err(Error::Invariant(_))));
    }
}
