//! Page preview generation.
//!
//! [`ThumbnailRenderer`] takes uploaded files in order and returns one
//! [`PageRecord`] per page, file order first and page order second. A file that
//! cannot be opened or rendered contributes no records at all; it is reported in
//! [`RenderOutcome::warnings`] and the remaining files are still processed.

use std::fmt;
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ThumbnailOptions;
use crate::error::{CollateError, Result};
use crate::model::{PageRecord, PreviewImage, SourceFile};
use crate::render::rasterizer::{RasterError, Rasterizer};

/// A file that was skipped during rendering.
#[derive(Debug)]
pub struct RenderWarning {
    /// Display name of the file.
    pub file_name: String,
    /// What went wrong.
    pub error: CollateError,
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// Result of rendering a batch of files.
#[derive(Debug, Default)]
pub struct RenderOutcome {
    /// New records, in file order then page order.
    pub records: Vec<PageRecord>,
    /// One entry per skipped file.
    pub warnings: Vec<RenderWarning>,
    /// Time spent rendering the batch.
    pub render_time: Duration,
}

impl RenderOutcome {
    /// Number of files that produced records.
    pub fn files_rendered(&self) -> usize {
        let mut sources: Vec<_> = self.records.iter().map(|r| r.source().id()).collect();
        sources.dedup();
        sources.len()
    }
}

/// Converts uploaded files into page records with JPEG previews.
///
/// The renderer holds no mutable state; the same instance can serve any number
/// of batches.
#[derive(Clone)]
pub struct ThumbnailRenderer {
    rasterizer: Arc<dyn Rasterizer>,
    options: ThumbnailOptions,
}

impl fmt::Debug for ThumbnailRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThumbnailRenderer")
            .field("rasterizer", &self.rasterizer.name())
            .field("options", &self.options)
            .finish()
    }
}

impl ThumbnailRenderer {
    pub fn new(rasterizer: Box<dyn Rasterizer>, options: ThumbnailOptions) -> Self {
        Self {
            rasterizer: Arc::from(rasterizer),
            options,
        }
    }

    pub fn options(&self) -> &ThumbnailOptions {
        &self.options
    }

    /// Name of the backend in use.
    pub fn backend(&self) -> &'static str {
        self.rasterizer.name()
    }

    /// Render every page of every file.
    ///
    /// # Errors
    ///
    /// Only returns [`CollateError::Cancelled`]; per-file failures end up in
    /// [`RenderOutcome::warnings`].
    pub async fn render(
        &self,
        files: &[Arc<SourceFile>],
        cancel: &CancellationToken,
    ) -> Result<RenderOutcome> {
        let start = Instant::now();
        let mut outcome = RenderOutcome::default();

        for file in files {
            if cancel.is_cancelled() {
                return Err(CollateError::Cancelled);
            }

            match self.render_file(file, cancel).await {
                Ok(records) => {
                    debug!(file = file.name(), pages = records.len(), "Rendered file");
                    outcome.records.extend(records);
                }
                Err(CollateError::Cancelled) => return Err(CollateError::Cancelled),
                Err(error) => {
                    warn!(file = file.name(), %error, "Skipping file");
                    outcome.warnings.push(RenderWarning {
                        file_name: file.name().to_string(),
                        error,
                    });
                }
            }
        }

        outcome.render_time = start.elapsed();
        info!(
            files = files.len(),
            pages = outcome.records.len(),
            skipped = outcome.warnings.len(),
            backend = self.backend(),
            "Rendered previews"
        );

        Ok(outcome)
    }

    /// Render one file on the blocking pool. All pages succeed or the whole file
    /// fails.
    async fn render_file(
        &self,
        file: &Arc<SourceFile>,
        cancel: &CancellationToken,
    ) -> Result<Vec<PageRecord>> {
        let rasterizer = Arc::clone(&self.rasterizer);
        let source = Arc::clone(file);
        let options = self.options;
        let cancel = cancel.clone();
        let name = file.name().to_string();

        task::spawn_blocking(move || -> Result<Vec<PageRecord>> {
            let images = rasterizer
                .render_pages(source.bytes(), options.scale, &cancel)
                .map_err(|e| match e {
                    RasterError::Cancelled => CollateError::Cancelled,
                    other => CollateError::render_failed(source.name(), other.to_string()),
                })?;

            if images.is_empty() {
                return Err(CollateError::render_failed(
                    source.name(),
                    "document has no pages",
                ));
            }

            images
                .iter()
                .enumerate()
                .map(|(index, image)| {
                    let preview = encode_jpeg(image, options.jpeg_quality).map_err(|reason| {
                        CollateError::render_failed(
                            source.name(),
                            format!("cannot encode preview of page {}: {reason}", index + 1),
                        )
                    })?;
                    Ok::<_, CollateError>(PageRecord::new(Arc::clone(&source), index, preview))
                })
                .collect()
        })
        .await
        .map_err(|e| CollateError::render_failed(name, format!("rendering stopped: {e}")))?
    }
}

/// Encode an RGBA raster as a JPEG preview. Alpha is dropped.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> std::result::Result<PreviewImage, String> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
    let mut data = Cursor::new(Vec::new());

    JpegEncoder::new_with_quality(&mut data, quality)
        .write_image(
            rgb.as_raw(),
            rgb.width(),
            rgb.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| e.to_string())?;

    Ok(PreviewImage::jpeg(rgb.width(), rgb.height(), data.into_inner()))
}
