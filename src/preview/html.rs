use super::{PreviewFrame, PreviewService};
use crate::mime::detect_image_mime;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

const PAGE_TITLE: &str = "Image preview";

/// Renders every frame into a single self-contained HTML page.
///
/// Images are inlined as base64 data URIs so the page can be opened without
/// the archive. The page is written on [`PreviewService::finish`].
pub struct HtmlPreview {
    path: PathBuf,
    rows: Mutex<Vec<String>>,
}

impl HtmlPreview {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            rows: Mutex::new(Vec::new()),
        }
    }

    fn lock_rows(&self) -> Result<MutexGuard<'_, Vec<String>>> {
        self.rows
            .lock()
            .map_err(|e| Error::Invariant(format!("Preview rows lock poisoned: {}", e)))
    }

    fn figure(caption: &str, bytes: &[u8]) -> String {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        format!(
            "<figure><img src=\"data:{};base64,{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>",
            detect_image_mime(bytes),
            data,
            escape_html(caption),
            escape_html(caption)
        )
    }

    fn render(&self) -> Result<String> {
        let rows = self.lock_rows()?;
        let mut page = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
             <style>.pair{{display:flex;gap:1em}}figure{{flex:1;margin:0}}img{{max-width:100%}}</style>\n\
             </head>\n<body>\n<h1>{}</h1>\n",
            PAGE_TITLE, PAGE_TITLE
        );
        for row in rows.iter() {
            page.push_str(row);
            page.push('\n');
        }
        page.push_str("</body>\n</html>\n");
        Ok(page)
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[async_trait]
impl PreviewService for HtmlPreview {
    async fn show(&self, frame: PreviewFrame<'_>) -> Result<()> {
        let row = format!(
            "<div class=\"pair\">{}{}</div>",
            Self::figure(frame.original_caption, frame.original),
            Self::figure(frame.transformed_caption, frame.transformed)
        );
        self.lock_rows()?.push(row);
        Ok(())
    }

    async fn finish(&self) -> Result<()> {
        let page = self.render()?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, page).await?;
        info!("Wrote preview page to {}", self.path.display());
        Ok(())
    }
}
