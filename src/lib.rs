//! pdfcollate - Collect pages from PDF files into one document.
//!
//! Uploaded PDFs are split into pages, each with a small JPEG preview. The
//! pages form an ordered list that can be reordered and thinned out, and the
//! final list is assembled into a single PDF.
//!
//! - [`render`]: previews and page records for uploaded files
//! - [`model`]: the page list and the records in it
//! - [`assemble`]: building the combined document
//! - [`session`]: the shared, versioned page list and its operations
//! - [`io`]: reading uploads, writing output, exporting previews
//!
//! # Examples
//!
//! ```no_run
//! use pdfcollate::config::{Config, RendererKind};
//! use pdfcollate::session::Session;
//! use std::path::PathBuf;
//!
//! # async fn example() -> pdfcollate::Result<()> {
//! let config = Config {
//!     inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     renderer: RendererKind::Placeholder,
//!     compress: true,
//!     ..Default::default()
//! };
//!
//! let session = Session::from_config(&config)?;
//! let report = session.upload(&config.inputs).await?;
//!
//! let version = session.version().await;
//! session.move_page(report.pages_added - 1, 0, version).await?;
//!
//! let pdf = session.assemble().await?;
//! println!("Created {} page document", pdf.statistics.pages);
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod assemble;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod output;
pub mod render;
pub mod session;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{CollateError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
