//! CLI argument parsing for pdfcollate.
//!
//! This module defines the command-line interface using `clap` and turns it
//! into a [`Config`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use pdfcollate::config::{
    Config, DEFAULT_JPEG_QUALITY, DEFAULT_THUMBNAIL_SCALE, EditOp, Metadata, OverwriteMode,
    RendererKind, ThumbnailOptions,
};
use pdfcollate::error::{CollateError, Result};
use pdfcollate::utils::collect_paths_for_patterns;

/// Collect pages from PDF files into a single document.
///
/// Every page of every input becomes one entry of an ordered page list.
/// Pages can be deleted or moved with --edit before the list is saved as
/// one combined PDF.
#[derive(Parser, Debug)]
#[command(name = "pdfcollate")]
#[command(version)]
#[command(about = "Collect pages from PDF files into a single document", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files, in upload order
    ///
    /// Glob patterns are expanded and sorted. Files that are not PDFs are
    /// reported and left out.
    ///
    /// Examples:
    ///   pdfcollate scan1.pdf scan2.pdf -o combined.pdf
    ///   pdfcollate 'chapters/*.pdf' -e move:5:1
    #[arg(value_name = "FILE", required_unless_present = "input_list")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    ///
    /// Defaults to combined_document_<timestamp>.pdf in the current
    /// directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Edit the page list before saving (repeatable, applied in order)
    ///
    /// Positions are 1-based and refer to the list after the previous edit.
    ///   delete:N       remove the page at position N
    ///   move:FROM:TO   move the page at FROM so it ends up at TO
    #[arg(short, long = "edit", value_name = "EDIT")]
    pub edits: Vec<String>,

    /// Dry run - render and edit, print the final page order, write nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show page ids and timing details
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Preview rasterizer: auto, pdfium, or placeholder
    ///
    /// auto uses PDFium when the library can be found and blank placeholder
    /// previews otherwise.
    #[arg(long, value_name = "NAME", default_value = "auto", env = "PDFCOLLATE_RENDERER")]
    #[arg(value_parser = ["auto", "pdfium", "placeholder"])]
    pub renderer: String,

    /// Directory containing the PDFium shared library
    #[arg(long, value_name = "DIR", env = "PDFCOLLATE_PDFIUM_DIR")]
    pub pdfium_dir: Option<PathBuf>,

    /// Preview size as a factor of the page size in points
    #[arg(
        long,
        value_name = "FACTOR",
        default_value_t = DEFAULT_THUMBNAIL_SCALE,
        env = "PDFCOLLATE_THUMBNAIL_SCALE"
    )]
    pub thumbnail_scale: f32,

    /// JPEG quality of the previews (1-100)
    #[arg(
        long,
        value_name = "N",
        default_value_t = DEFAULT_JPEG_QUALITY,
        env = "PDFCOLLATE_JPEG_QUALITY"
    )]
    pub jpeg_quality: u8,

    /// Write every preview image into this directory
    #[arg(long = "thumbnails", value_name = "DIR")]
    pub thumbnails_dir: Option<PathBuf>,

    /// Write a JSON manifest of the final page order to this file
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Include preview images as data URLs in the manifest
    #[arg(long, requires = "manifest")]
    pub embed_previews: bool,

    /// Do not compress streams in the output
    #[arg(long)]
    pub no_compress: bool,

    /// Set title metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Set author metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub author: Option<String>,

    /// Set subject metadata for output PDF
    #[arg(long, value_name = "TEXT")]
    pub subject: Option<String>,

    /// Set keywords metadata for output PDF (comma-separated)
    #[arg(long, value_name = "TEXT")]
    pub keywords: Option<String>,

    /// Read input paths from a file (one path per line, '-' for stdin)
    ///
    /// Lines starting with '#' and blank lines are ignored. Paths from the
    /// file come after direct inputs.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// `inputs` are left as given on the command line; see
    /// [`Cli::get_all_inputs`] for the expanded list.
    ///
    /// # Errors
    ///
    /// Returns an error if the renderer or an edit cannot be parsed, or if the
    /// resulting configuration is invalid.
    pub fn to_config(&self) -> Result<Config> {
        let renderer = RendererKind::from_str(&self.renderer)?;

        let edits = self
            .edits
            .iter()
            .map(|edit| EditOp::from_str(edit))
            .collect::<Result<Vec<_>>>()?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let metadata = Metadata::new(
            self.title.clone(),
            self.author.clone(),
            self.subject.clone(),
            self.keywords.clone(),
        );

        let config = Config {
            inputs: self.inputs.iter().map(PathBuf::from).collect(),
            output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            renderer,
            pdfium_dir: self.pdfium_dir.clone(),
            thumbnail: ThumbnailOptions {
                scale: self.thumbnail_scale,
                jpeg_quality: self.jpeg_quality,
            },
            edits,
            metadata,
            compress: !self.no_compress,
            thumbnails_dir: self.thumbnails_dir.clone(),
            manifest: self.manifest.clone(),
            embed_previews: self.embed_previews,
        };

        if config.inputs.is_empty() && self.input_list.is_some() {
            // Inputs arrive through the list file; validated after reading it.
            config
                .thumbnail
                .validate()
                .map_err(|e| CollateError::invalid_config(format!("{e:#}")))?;
            return Ok(config);
        }

        config.validate().map_err(|e| {
            CollateError::invalid_config(format!("Configuration validation failed: {e:#}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no inputs at all, or if an edit or the
    /// thumbnail options are malformed.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() && self.input_list.is_none() {
            return Err(CollateError::invalid_config("No input files specified"));
        }

        for edit in &self.edits {
            EditOp::from_str(edit)?;
        }

        if self.embed_previews && self.manifest.is_none() {
            return Err(CollateError::invalid_config(
                "--embed-previews requires --manifest",
            ));
        }

        ThumbnailOptions {
            scale: self.thumbnail_scale,
            jpeg_quality: self.jpeg_quality,
        }
        .validate()
        .map_err(|e| CollateError::invalid_config(format!("{e:#}")))
    }

    /// Get all input paths: expanded patterns, then the input list.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is malformed, the input list cannot be
    /// read, or nothing is left to upload.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = collect_paths_for_patterns(&self.inputs)?;

        if let Some(ref input_list_path) = self.input_list {
            all_inputs.extend(read_input_list(input_list_path).await?);
        }

        if all_inputs.is_empty() {
            return Err(CollateError::invalid_config("No input files specified"));
        }

        Ok(all_inputs)
    }
}

/// Read input paths from a file, or from stdin when `path` is `-`.
async fn read_input_list(path: &Path) -> Result<Vec<PathBuf>> {
    if path.as_os_str() == "-" {
        let reader = BufReader::new(tokio::io::stdin());
        return read_paths(reader, path).await;
    }

    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| CollateError::FailedToReadInputList {
            path: path.to_path_buf(),
            source: e,
        })?;

    read_paths(BufReader::new(file), path).await
}

/// One path per line. Lines starting with '#' and blank lines are skipped.
async fn read_paths<R>(reader: R, origin: &Path) -> Result<Vec<PathBuf>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut paths = Vec::new();
    let mut line_number = 0;

    while let Some(line) =
        lines
            .next_line()
            .await
            .map_err(|e| CollateError::FailedToReadInputList {
                path: origin.to_path_buf(),
                source: e,
            })?
    {
        line_number += 1;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.contains('\0') {
            return Err(CollateError::InvalidInputList {
                path: origin.to_path_buf(),
                line_number,
                details: "Path contains a NUL byte".to_string(),
            });
        }

        paths.push(PathBuf::from(line));
    }

    Ok(paths)
}
