//! Reading uploaded files from disk.
//!
//! [`UploadFilter`] is the gate between the file system and the renderer: it
//! accepts files whose mime type is `application/pdf`, reads them into memory
//! and reports every other path as an [`UploadWarning`]. One bad path never
//! stops the rest of the batch.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use mime_guess::mime;
use tracing::{debug, warn};

use crate::error::{CollateError, Result};
use crate::model::SourceFile;

/// Default number of files read concurrently.
const DEFAULT_CONCURRENCY: usize = 4;

/// A path that was not accepted.
#[derive(Debug)]
pub struct UploadWarning {
    /// The rejected path.
    pub path: PathBuf,
    /// Why it was rejected.
    pub error: CollateError,
}

impl fmt::Display for UploadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Files read in one upload, in the order they were given.
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub accepted: Vec<Arc<SourceFile>>,
    pub rejected: Vec<UploadWarning>,
}

impl UploadBatch {
    /// Total size of the accepted files.
    pub fn total_bytes(&self) -> u64 {
        self.accepted.iter().map(|file| file.size()).sum()
    }
}

/// Filters and reads candidate upload paths.
#[derive(Debug, Clone)]
pub struct UploadFilter {
    concurrency: usize,
}

impl UploadFilter {
    pub fn new() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Check the guessed mime type of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::NotAPdf`] with the detected type otherwise.
    pub fn check_mime(path: &Path) -> Result<()> {
        let guess = mime_guess::from_path(path);
        match guess.first() {
            Some(m) if m == mime::APPLICATION_PDF => Ok(()),
            other => Err(CollateError::NotAPdf {
                name: display_name(path),
                detected: other
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
            }),
        }
    }

    /// Read a single accepted file.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a PDF by mime type, does not exist,
    /// is not a regular file, or cannot be read.
    pub async fn read(&self, path: &Path) -> Result<SourceFile> {
        Self::check_mime(path)?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| CollateError::file_not_found(path.to_path_buf()))?;

        if !metadata.is_file() {
            return Err(CollateError::not_a_file(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CollateError::FailedToReadFile {
                path: path.to_path_buf(),
                source: e,
            })?;

        debug!(path = %path.display(), size = bytes.len(), "Read upload");
        Ok(SourceFile::from_path(path, bytes))
    }

    /// Read every path, keeping the accepted files in input order.
    pub async fn collect(&self, paths: &[PathBuf]) -> UploadBatch {
        let results: Vec<(PathBuf, Result<SourceFile>)> = stream::iter(paths.iter().cloned())
            .map(|path| async move {
                let result = self.read(&path).await;
                (path, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut batch = UploadBatch::default();
        for (path, result) in results {
            match result {
                Ok(file) => batch.accepted.push(Arc::new(file)),
                Err(error) => {
                    warn!(path = %path.display(), %error, "Rejected upload");
                    batch.rejected.push(UploadWarning { path, error });
                }
            }
        }

        batch
    }
}

impl Default for UploadFilter {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
