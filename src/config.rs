//! Configuration module for pdfcollate.
//!
//! This module turns CLI arguments into a validated configuration that drives
//! a collate run. It handles:
//! - Parsing of edit operations and renderer selection
//! - Thumbnail and metadata options
//! - Validation of argument combinations

use anyhow::{Context, Result, bail};

use crate::CollateError;
use std::{fmt, path::PathBuf, str::FromStr};

/// Default downscale factor for page previews.
pub const DEFAULT_THUMBNAIL_SCALE: f32 = 0.5;

/// Default JPEG quality (1-100) for page previews.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Which rasterization backend renders page previews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    /// Use PDFium when the library can be loaded, otherwise fall back to the
    /// placeholder renderer.
    #[default]
    Auto,
    /// Require PDFium.
    Pdfium,
    /// Blank page-sized previews; needs no native library.
    Placeholder,
}

impl FromStr for RendererKind {
    type Err = CollateError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "pdfium" => Ok(Self::Pdfium),
            "placeholder" => Ok(Self::Placeholder),
            _ => Err(CollateError::invalid_config(format!(
                "Invalid renderer: {s}. Must be one of: auto, pdfium, placeholder"
            ))),
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Pdfium => "pdfium",
            Self::Placeholder => "placeholder",
        };
        f.write_str(name)
    }
}

/// Preview rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailOptions {
    /// Factor applied to the page size in points to get pixel dimensions.
    pub scale: f32,
    /// JPEG quality, 1-100.
    pub jpeg_quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            scale: DEFAULT_THUMBNAIL_SCALE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ThumbnailOptions {
    /// Check that scale and quality are usable.
    pub fn validate(&self) -> Result<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 || self.scale > 8.0 {
            bail!(
                "Thumbnail scale must be greater than 0 and at most 8, got {}",
                self.scale
            );
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            bail!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            );
        }

        Ok(())
    }
}

/// One reorder-grid gesture, using 1-based positions as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Remove the page currently at `position`.
    Delete { position: usize },
    /// Move the page at `from` so that it ends up at `to`.
    Move { from: usize, to: usize },
}

impl EditOp {
    fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();

        match parts.as_slice() {
            ["delete" | "del" | "d", position] => Ok(Self::Delete {
                position: parse_position(position)?,
            }),
            ["move" | "mv" | "m", from, to] => Ok(Self::Move {
                from: parse_position(from)?,
                to: parse_position(to)?,
            }),
            [op, ..] if !matches!(*op, "delete" | "del" | "d" | "move" | "mv" | "m") => {
                bail!("Unknown operation '{op}'. Expected 'delete:N' or 'move:FROM:TO'")
            }
            _ => bail!("Expected 'delete:N' or 'move:FROM:TO'"),
        }
    }
}

fn parse_position(s: &str) -> Result<usize> {
    let position: usize = s
        .parse()
        .with_context(|| format!("Invalid page position: {s}"))?;

    if position == 0 {
        bail!("Page positions must be positive (1-indexed)");
    }

    Ok(position)
}

impl FromStr for EditOp {
    type Err = CollateError;

    /// Parse `delete:N` or `move:FROM:TO`.
    ///
    /// # Errors
    ///
    /// Returns [`CollateError::InvalidEdit`] if the text is not a valid edit.
    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s).map_err(|e| CollateError::invalid_edit(s, format!("{e:#}")))
    }
}

impl fmt::Display for EditOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delete { position } => write!(f, "delete:{position}"),
            Self::Move { from, to } => write!(f, "move:{from}:{to}"),
        }
    }
}

/// PDF metadata to set on the output document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Document subject.
    pub subject: Option<String>,
    /// Document keywords (comma-separated).
    pub keywords: Option<String>,
}

impl Metadata {
    /// Check if any metadata fields are set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.subject.is_none()
            && self.keywords.is_none()
    }

    /// Create metadata from optional strings, trimming whitespace.
    pub fn new(
        title: Option<String>,
        author: Option<String>,
        subject: Option<String>,
        keywords: Option<String>,
    ) -> Self {
        let to_string_opt = |opt: Option<String>| {
            opt.filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().to_string())
        };

        Self {
            title: to_string_opt(title),
            author: to_string_opt(author),
            subject: to_string_opt(subject),
            keywords: to_string_opt(keywords),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for one collate run.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Input PDF file paths, in upload order.
    pub inputs: Vec<PathBuf>,

    /// Output PDF file path. `None` picks a generated name in the working
    /// directory.
    pub output: Option<PathBuf>,

    /// Render and edit, but write nothing.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Rasterization backend.
    pub renderer: RendererKind,

    /// Directory containing the PDFium shared library.
    pub pdfium_dir: Option<PathBuf>,

    /// Preview rendering parameters.
    pub thumbnail: ThumbnailOptions,

    /// Edits applied to the page list, in order.
    pub edits: Vec<EditOp>,

    /// Metadata to set on the output document.
    pub metadata: Metadata,

    /// Compress streams in the output document.
    pub compress: bool,

    /// Export every preview image into this directory.
    pub thumbnails_dir: Option<PathBuf>,

    /// Write a JSON manifest of the final page order to this file.
    pub manifest: Option<PathBuf>,

    /// Include preview data URLs in the manifest.
    pub embed_previews: bool,
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - Verbose and quiet modes are both enabled
    /// - Thumbnail options are out of range
    /// - The output path is also an input
    /// - Previews are embedded without a manifest
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        self.thumbnail.validate()?;

        if let Some(output) = &self.output
            && self.inputs.iter().any(|input| input == output)
        {
            bail!(
                "Output file cannot be the same as an input file: {}",
                output.display()
            );
        }

        if self.embed_previews && self.manifest.is_none() {
            bail!("--embed-previews requires --manifest");
        }

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
