//! Writing the combined document and choosing where it goes.
//!
//! Writes are atomic: the bytes go to a temporary file next to the target,
//! which is then renamed into place. A reader never sees a half-written PDF.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{CollateError, Result};
use crate::utils::format_file_size;

/// File name prefix of generated output names.
pub const DEFAULT_OUTPUT_PREFIX: &str = "combined_document";

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes byte buffers to disk.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter;

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, written, or renamed into
    /// place. On error the target path is left untouched.
    pub async fn save(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        let write_path = temp_path_for(path);

        let mut file =
            fs::File::create(&write_path)
                .await
                .map_err(|e| CollateError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                })?;

        let written: std::io::Result<()> = async {
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = fs::remove_file(&write_path).await;
            return Err(CollateError::FailedToWrite {
                path: write_path,
                source: e,
            });
        }
        drop(file);

        fs::rename(&write_path, path)
            .await
            .map_err(|e| CollateError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            })?;

        let file_size = fs::metadata(path)
            .await
            .map(|m| m.len())
            .unwrap_or(bytes.len() as u64);

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
        })
    }

    /// Check that the parent directory of `path` exists and is writable.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::InvalidConfig`] otherwise.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = fs::metadata(parent).await.map_err(|_| {
            CollateError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if !metadata.is_dir() {
            return Err(CollateError::invalid_config(format!(
                "Output directory is not a directory: {}",
                parent.display()
            )));
        }

        if metadata.permissions().readonly() {
            return Err(CollateError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Check if output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).await.is_ok()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// File name for a download started at `now`:
/// `combined_document_<YYYYmmdd-HHMMSS-mmm>.pdf`.
pub fn default_output_name(now: DateTime<Local>) -> String {
    format!(
        "{DEFAULT_OUTPUT_PREFIX}_{}.pdf",
        now.format("%Y%m%d-%H%M%S-%3f")
    )
}

/// Generated output path in `dir` that does not exist yet.
///
/// When the timestamped name is taken, `-1`, `-2`, ... is appended to the
/// stem until a free name is found.
pub async fn default_output_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    let name = default_output_name(now);
    let candidate = dir.join(&name);
    if fs::metadata(&candidate).await.is_err() {
        return candidate;
    }

    let stem = name.trim_end_matches(".pdf");
    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{stem}-{counter}.pdf"));
        if fs::metadata(&candidate).await.is_err() {
            return candidate;
        }
        counter += 1;
    }
}
