//! Thumbnail rendering.
//!
//! - [`rasterizer`]: backends that turn PDF bytes into page images
//! - [`thumbnail`]: batch rendering of uploaded files into page records

pub mod rasterizer;
pub mod thumbnail;

pub use rasterizer::{
    PdfiumRasterizer, PlaceholderRasterizer, RasterError, Rasterizer, create_rasterizer,
};
pub use thumbnail::{RenderOutcome, RenderWarning, ThumbnailRenderer, encode_jpeg};
