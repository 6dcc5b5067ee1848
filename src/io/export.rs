//! Exporting previews and the page manifest.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;

use crate::error::{CollateError, Result};
use crate::io::writer::PdfWriter;
use crate::model::{PageId, PageList, PageRecord};

/// One page of the final order, as written to the manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// 1-based position in the combined document.
    pub position: usize,
    pub id: PageId,
    /// Display name of the source file.
    pub source: String,
    /// 1-based page number within the source file.
    pub page: usize,
    pub width: u32,
    pub height: u32,
    /// Exported thumbnail file name, when thumbnails were written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    /// `data:` URL of the preview.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// JSON description of the page list.
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub generator: String,
    pub generated_at: DateTime<Utc>,
    /// Page list version the manifest was taken from.
    pub version: u64,
    pub pages: Vec<ManifestEntry>,
}

impl Manifest {
    /// Describe `list`. Preview data URLs are included when `embed_previews`
    /// is set.
    pub fn from_list(list: &PageList, embed_previews: bool, with_thumbnails: bool) -> Self {
        let pages = list
            .iter()
            .enumerate()
            .map(|(index, record)| ManifestEntry {
                position: index + 1,
                id: record.id(),
                source: record.source().name().to_string(),
                page: record.source_page_index() + 1,
                width: record.preview().width(),
                height: record.preview().height(),
                thumbnail: with_thumbnails.then(|| thumbnail_file_name(index, record)),
                preview: embed_previews.then(|| record.preview().to_data_url()),
            })
            .collect();

        Self {
            generator: format!("{} {}", crate::NAME, crate::VERSION),
            generated_at: Utc::now(),
            version: list.version(),
            pages,
        }
    }

    /// Serialise to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CollateError::other(format!("Failed to serialise manifest: {e}")))
    }

    /// Write the manifest to `path` atomically.
    pub async fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        PdfWriter::new().save(json.as_bytes(), path).await?;
        Ok(())
    }
}

/// Thumbnail file name for the record at `index`: `NNN-<stem>-p<page>.jpg`.
pub fn thumbnail_file_name(index: usize, record: &PageRecord) -> String {
    format!(
        "{:03}-{}-p{}.jpg",
        index + 1,
        sanitize(record.source().stem()),
        record.source_page_index() + 1
    )
}

fn sanitize(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write every preview of `list`, in list order, into `dir`.
///
/// The directory is created if needed. Returns the written paths.
pub async fn export_thumbnails(list: &PageList, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| CollateError::FailedToCreateOutput {
            path: dir.to_path_buf(),
            source: e,
        })?;

    let writer = PdfWriter::new();
    let mut written = Vec::with_capacity(list.len());

    for (index, record) in list.iter().enumerate() {
        let path = dir.join(thumbnail_file_name(index, record));
        writer.save(record.preview().data(), &path).await?;
        written.push(path);
    }

    Ok(written)
}
