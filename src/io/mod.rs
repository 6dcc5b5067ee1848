//! File system boundary.
//!
//! - [`upload`]: accepting and reading candidate PDF files
//! - [`writer`]: atomic output writes and generated output names
//! - [`export`]: preview images and the JSON page manifest

pub mod export;
pub mod upload;
pub mod writer;

pub use export::{Manifest, ManifestEntry, export_thumbnails, thumbnail_file_name};
pub use upload::{UploadBatch, UploadFilter, UploadWarning};
pub use writer::{PdfWriter, WriteStatistics, default_output_name, default_output_path};
