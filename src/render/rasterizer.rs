//! Rasterization backends.
//!
//! A [`Rasterizer`] turns the bytes of one PDF file into one RGBA image per
//! page. Two backends exist:
//!
//! - [`PdfiumRasterizer`] renders real page content through PDFium. The shared
//!   library is located at runtime.
//! - [`PlaceholderRasterizer`] only parses the page tree with `lopdf` and
//!   produces blank images with the right proportions. It needs no native
//!   library and is what tests use.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use lopdf::Document;
use pdfium_render::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::RendererKind;
use crate::error::{CollateError, Result};
use crate::utils::page_size;

/// Largest preview edge in pixels.
pub const MAX_PREVIEW_DIMENSION: u32 = 10_000;

/// Failure while rasterizing a single file.
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    /// The bytes could not be opened as a PDF.
    #[error("cannot open document: {0}")]
    Open(String),

    /// A page failed to render.
    #[error("cannot render page {}: {reason}", index + 1)]
    Page { index: usize, reason: String },

    /// Rendering stopped because the token was cancelled.
    #[error("rendering cancelled")]
    Cancelled,
}

/// A backend that renders every page of a PDF file.
///
/// Implementations must be usable from the blocking thread pool, so they only
/// hold configuration; any native handles live for the duration of one
/// [`render_pages`](Rasterizer::render_pages) call.
pub trait Rasterizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Render all pages of `bytes`, in page order, scaled by `scale` relative to
    /// the page size in points.
    ///
    /// Implementations check `cancel` before every page.
    fn render_pages(
        &self,
        bytes: &[u8],
        scale: f32,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<RgbaImage>, RasterError>;
}

/// Pixel size of page `index`, `width` x `height` points, rendered at `scale`.
///
/// Pages whose scaled edges are not finite or exceed
/// [`MAX_PREVIEW_DIMENSION`] are refused with [`RasterError::Page`].
pub fn preview_dimensions(
    index: usize,
    width: f32,
    height: f32,
    scale: f32,
) -> std::result::Result<(u32, u32), RasterError> {
    let edge = |points: f32| {
        let pixels = (points * scale).round();
        (pixels.is_finite() && pixels <= MAX_PREVIEW_DIMENSION as f32)
            .then(|| (pixels as u32).max(1))
    };

    match (edge(width), edge(height)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => Err(RasterError::Page {
            index,
            reason: format!(
                "page of {width} x {height} pt is too large to preview at scale {scale}"
            ),
        }),
    }
}

/// Build the backend selected by `kind`.
///
/// # Errors
///
/// Returns [`CollateError::RasterizerUnavailable`] if `kind` is
/// [`RendererKind::Pdfium`] and the library cannot be loaded.
pub fn create_rasterizer(
    kind: RendererKind,
    pdfium_dir: Option<&Path>,
) -> Result<Box<dyn Rasterizer>> {
    match kind {
        RendererKind::Placeholder => Ok(Box::new(PlaceholderRasterizer)),
        RendererKind::Pdfium => Ok(Box::new(PdfiumRasterizer::locate(pdfium_dir)?)),
        RendererKind::Auto => match PdfiumRasterizer::locate(pdfium_dir) {
            Ok(rasterizer) => Ok(Box::new(rasterizer)),
            Err(err) => {
                warn!(error = %err, "PDFium not available, previews will be blank placeholders");
                Ok(Box::new(PlaceholderRasterizer))
            }
        },
    }
}

/// Where the PDFium library was found.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PdfiumLibrary {
    Path(PathBuf),
    System,
}

/// Renders pages through PDFium.
#[derive(Debug, Clone)]
pub struct PdfiumRasterizer {
    library: PdfiumLibrary,
}

impl PdfiumRasterizer {
    /// Find a loadable PDFium library.
    ///
    /// Searches, in order:
    /// 1. `dir` when given
    /// 2. the current directory
    /// 3. `vendor/pdfium/lib/`
    /// 4. the system library path
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::RasterizerUnavailable`] if none of them load.
    pub fn locate(dir: Option<&Path>) -> Result<Self> {
        let mut candidates = Vec::new();
        if let Some(dir) = dir {
            candidates.push(Pdfium::pdfium_platform_library_name_at_path(dir));
        }
        candidates.push(Pdfium::pdfium_platform_library_name_at_path("./"));
        candidates.push(Pdfium::pdfium_platform_library_name_at_path(
            "./vendor/pdfium/lib/",
        ));

        for candidate in candidates {
            match Pdfium::bind_to_library(&candidate) {
                Ok(_) => {
                    debug!(path = %candidate.display(), "Found PDFium library");
                    return Ok(Self {
                        library: PdfiumLibrary::Path(candidate),
                    });
                }
                Err(e) => debug!(path = %candidate.display(), error = ?e, "PDFium not loadable"),
            }
        }

        Pdfium::bind_to_system_library()
            .map(|_| Self {
                library: PdfiumLibrary::System,
            })
            .map_err(|e| {
                CollateError::rasterizer_unavailable(format!(
                    "Failed to load PDFium library. Place libpdfium next to the binary or set PDFCOLLATE_PDFIUM_DIR: {e:?}"
                ))
            })
    }

    fn bind(&self) -> std::result::Result<Pdfium, RasterError> {
        let bindings = match &self.library {
            PdfiumLibrary::Path(path) => Pdfium::bind_to_library(path),
            PdfiumLibrary::System => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| RasterError::Open(format!("PDFium unavailable: {e:?}")))?;

        Ok(Pdfium::new(bindings))
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn name(&self) -> &'static str {
        "pdfium"
    }

    fn render_pages(
        &self,
        bytes: &[u8],
        scale: f32,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<RgbaImage>, RasterError> {
        let pdfium = self.bind()?;
        let document = pdfium
            .load_pdf_from_byte_slice(bytes, None)
            .map_err(|e| RasterError::Open(format!("{e:?}")))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(scale);
        let mut images = Vec::new();

        for (index, page) in document.pages().iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(RasterError::Cancelled);
            }

            preview_dimensions(index, page.width().value, page.height().value, scale)?;

            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| RasterError::Page {
                    index,
                    reason: format!("{e:?}"),
                })?;
            images.push(bitmap.as_image().to_rgba8());
        }

        Ok(images)
    }
}

/// Renders a blank white image per page, sized from the page's MediaBox.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRasterizer;

impl Rasterizer for PlaceholderRasterizer {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn render_pages(
        &self,
        bytes: &[u8],
        scale: f32,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<RgbaImage>, RasterError> {
        let document = Document::load_mem(bytes).map_err(|e| RasterError::Open(e.to_string()))?;

        let mut images = Vec::new();
        for (index, page_id) in document.get_pages().into_values().enumerate() {
            if cancel.is_cancelled() {
                return Err(RasterError::Cancelled);
            }

            let (width, height) = page_size(&document, page_id);
            let (width, height) = preview_dimensions(index, width, height, scale)?;
            images.push(RgbaImage::from_pixel(
                width,
                height,
                Rgba([255, 255, 255, 255]),
            ));
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pdf_bytes, sized_pdf_bytes};
    use rstest::rstest;

    #[test]
    fn test_placeholder_renders_every_page() {
        let bytes = pdf_bytes(3);
        let images = PlaceholderRasterizer
            .render_pages(&bytes, 0.5, &CancellationToken::new())
            .unwrap();

        assert_eq!(images.len(), 3);
        assert_eq!(images[0].dimensions(), (306, 396));
    }

    #[test]
    fn test_placeholder_rejects_garbage() {
        let err = PlaceholderRasterizer
            .render_pages(b"not a pdf", 0.5, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, RasterError::Open(_)));
    }

    #[test]
    fn test_placeholder_stops_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let err = PlaceholderRasterizer
            .render_pages(&pdf_bytes(2), 0.5, &token)
            .unwrap_err();
        assert!(matches!(err, RasterError::Cancelled));
    }

    #[test]
    fn test_placeholder_refuses_oversized_page() {
        let bytes = sized_pdf_bytes(10_000_000_000, 10_000_000_000);
        let err = PlaceholderRasterizer
            .render_pages(&bytes, 0.5, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, RasterError::Page { index: 0, .. }));
        assert!(err.to_string().contains("too large"));
    }

    #[rstest]
    #[case(612.0, 792.0, 0.5, Some((306, 396)))]
    #[case(0.0, 0.0, 0.5, Some((1, 1)))]
    #[case(20_000.0, 20_000.0, 0.5, Some((10_000, 10_000)))]
    #[case(20_002.0, 100.0, 0.5, None)]
    #[case(1e10, 1e10, 0.5, None)]
    #[case(f32::INFINITY, 100.0, 0.5, None)]
    #[case(f32::NAN, 100.0, 0.5, None)]
    fn test_preview_dimensions(
        #[case] width: f32,
        #[case] height: f32,
        #[case] scale: f32,
        #[case] expected: Option<(u32, u32)>,
    ) {
        assert_eq!(preview_dimensions(0, width, height, scale).ok(), expected);
    }

    #[test]
    fn test_create_placeholder() {
        let rasterizer = create_rasterizer(RendererKind::Placeholder, None).unwrap();
        assert_eq!(rasterizer.name(), "placeholder");
    }

    #[test]
    fn test_page_error_is_one_based() {
        let err = RasterError::Page {
            index: 0,
            reason: "bad content stream".to_string(),
        };
        assert!(err.to_string().contains("page 1"));
    }
}
