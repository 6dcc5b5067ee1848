//! The editing session: one shared page list and the operations on it.
//!
//! [`Session`] is the only owner of the current [`PageList`]. Callers read
//! snapshots and submit edits together with the version they observed; an edit
//! against a list that has moved on fails with [`CollateError::StaleVersion`]
//! instead of silently overwriting someone else's change.
//!
//! Rendering runs without holding the lock. Its records are appended to the
//! list as it is when rendering finishes, so a late upload never undoes a
//! delete or move made while it was in flight.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::assemble::{AssembleOptions, AssembledPdf, DocumentAssembler};
use crate::config::{Config, EditOp};
use crate::error::{CollateError, Result};
use crate::io::{UploadFilter, UploadWarning};
use crate::model::{PageId, PageList, SourceFile};
use crate::render::{RenderWarning, ThumbnailRenderer, create_rasterizer};

/// What one upload added to the session.
#[derive(Debug, Default)]
pub struct UploadReport {
    /// Files read from disk.
    pub files_accepted: usize,
    /// Records appended to the page list.
    pub pages_added: usize,
    /// Paths that were not read.
    pub rejected: Vec<UploadWarning>,
    /// Files that were read but could not be rendered.
    pub skipped: Vec<RenderWarning>,
    /// Page list version after the append.
    pub version: u64,
}

impl UploadReport {
    /// Whether anything was rejected or skipped.
    pub fn has_warnings(&self) -> bool {
        !self.rejected.is_empty() || !self.skipped.is_empty()
    }
}

/// Shared page list plus the components that fill and consume it.
#[derive(Debug)]
pub struct Session {
    list: RwLock<PageList>,
    uploads: UploadFilter,
    renderer: ThumbnailRenderer,
    assembler: DocumentAssembler,
    cancel: CancellationToken,
}

impl Session {
    pub fn new(renderer: ThumbnailRenderer, assembler: DocumentAssembler) -> Self {
        Self {
            list: RwLock::new(PageList::new()),
            uploads: UploadFilter::new(),
            renderer,
            assembler,
            cancel: CancellationToken::new(),
        }
    }

    /// Build a session with the renderer and assembly options in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::RasterizerUnavailable`] if PDFium was required
    /// and cannot be loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let rasterizer = create_rasterizer(config.renderer, config.pdfium_dir.as_deref())?;
        let renderer = ThumbnailRenderer::new(rasterizer, config.thumbnail);
        let assembler = DocumentAssembler::with_options(AssembleOptions {
            compress: config.compress,
            metadata: config.metadata.clone(),
        });

        Ok(Self::new(renderer, assembler))
    }

    pub fn renderer(&self) -> &ThumbnailRenderer {
        &self.renderer
    }

    /// The current page list.
    pub async fn snapshot(&self) -> PageList {
        self.list.read().await.clone()
    }

    pub async fn version(&self) -> u64 {
        self.list.read().await.version()
    }

    /// Token that is cancelled by [`Session::cancel_all`].
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Cancel every running and future operation of this session.
    pub fn cancel_all(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Read, render and append the files at `paths`.
    ///
    /// Paths that are not PDFs or cannot be read end up in
    /// [`UploadReport::rejected`], files that fail to render in
    /// [`UploadReport::skipped`]. Neither stops the batch.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::Cancelled`] if the session is cancelled while
    /// rendering; nothing is appended in that case.
    pub async fn upload(&self, paths: &[PathBuf]) -> Result<UploadReport> {
        let batch = self.uploads.collect(paths).await;
        let files_accepted = batch.accepted.len();

        let (pages_added, skipped, version) = self.add_files(&batch.accepted).await?;

        Ok(UploadReport {
            files_accepted,
            pages_added,
            rejected: batch.rejected,
            skipped,
            version,
        })
    }

    /// Render already loaded files and append their pages.
    ///
    /// Returns the number of pages added, the files that were skipped and the
    /// resulting list version.
    pub async fn add_files(
        &self,
        files: &[Arc<SourceFile>],
    ) -> Result<(usize, Vec<RenderWarning>, u64)> {
        let outcome = self.renderer.render(files, &self.child_token()).await?;
        let pages_added = outcome.records.len();

        let mut list = self.list.write().await;
        *list = list.append(outcome.records);

        info!(
            pages = pages_added,
            total = list.len(),
            version = list.version(),
            "Appended pages"
        );

        Ok((pages_added, outcome.warnings, list.version()))
    }

    /// Delete the page at zero-based `index`.
    ///
    /// # Errors
    ///
    /// - [`CollateError::StaleVersion`] if the list is no longer at
    ///   `expected_version`
    /// - [`CollateError::InvalidPosition`] if `index` is out of bounds
    pub async fn delete_at(&self, index: usize, expected_version: u64) -> Result<PageList> {
        let mut list = self.list.write().await;
        check_version(&list, expected_version)?;

        let id = list
            .get(index)
            .map(|record| record.id())
            .ok_or(CollateError::InvalidPosition {
                index,
                len: list.len(),
            })?;

        *list = list.remove(id);
        debug!(%id, index, version = list.version(), "Deleted page");
        Ok(list.clone())
    }

    /// Remove the page with `id`. Removing an id that is not listed changes
    /// nothing.
    pub async fn remove(&self, id: PageId) -> PageList {
        let mut list = self.list.write().await;
        *list = list.remove(id);
        list.clone()
    }

    /// Move the page at `from` to `to`, both zero-based.
    ///
    /// # Errors
    ///
    /// - [`CollateError::StaleVersion`] if the list is no longer at
    ///   `expected_version`
    /// - [`CollateError::InvalidPosition`] if either index is out of bounds
    pub async fn move_page(
        &self,
        from: usize,
        to: usize,
        expected_version: u64,
    ) -> Result<PageList> {
        let mut list = self.list.write().await;
        check_version(&list, expected_version)?;

        *list = list.move_page(from, to)?;
        debug!(from, to, version = list.version(), "Moved page");
        Ok(list.clone())
    }

    /// Apply grid edits in order.
    ///
    /// Positions are 1-based and refer to the list as it is after the previous
    /// edit. Either every edit is applied or none is.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::InvalidPosition`] for a position past the end of
    /// the list and [`CollateError::InvalidEdit`] for position 0.
    pub async fn apply_edits(&self, edits: &[EditOp]) -> Result<PageList> {
        let mut list = self.list.write().await;
        let mut next = list.clone();

        for edit in edits {
            next = apply_edit(&next, edit)?;
            debug!(%edit, len = next.len(), "Applied edit");
        }

        *list = next;
        Ok(list.clone())
    }

    /// Build the combined document from the current list.
    ///
    /// # Errors
    ///
    /// See [`DocumentAssembler::assemble`]. The page list is never changed.
    pub async fn assemble(&self) -> Result<AssembledPdf> {
        let list = self.snapshot().await;
        self.assembler.assemble(&list, &self.child_token()).await
    }
}

fn check_version(list: &PageList, expected: u64) -> Result<()> {
    if list.version() != expected {
        return Err(CollateError::StaleVersion {
            expected,
            actual: list.version(),
        });
    }
    Ok(())
}

fn to_index(edit: &EditOp, position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| CollateError::invalid_edit(edit.to_string(), "positions start at 1"))
}

fn apply_edit(list: &PageList, edit: &EditOp) -> Result<PageList> {
    match *edit {
        EditOp::Delete { position } => {
            let index = to_index(edit, position)?;
            let record = list.get(index).ok_or(CollateError::InvalidPosition {
                index,
                len: list.len(),
            })?;
            Ok(list.remove(record.id()))
        }
        EditOp::Move { from, to } => list.move_page(to_index(edit, from)?, to_index(edit, to)?),
    }
}
