//! Error types for pdfcollate.
//!
//! Errors are designed to be informative and actionable, providing clear
//! context about what went wrong and how to fix it.
//!
//! # Error Categories
//!
//! - **I/O Errors**: File not found, permission denied, etc.
//! - **Render Errors**: A file could not be opened or rasterized
//! - **Edit Errors**: Invalid positions or stale page list versions
//! - **Assembly Errors**: Problems while building the combined document

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfcollate operations.
pub type Result<T> = std::result::Result<T, CollateError>;

/// Main error type for pdfcollate operations.
#[derive(Debug, thiserror::Error)]
pub enum CollateError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input path exists but is not a regular file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a file.
        path: PathBuf,
    },

    /// Input file could not be read.
    #[error("Cannot read file: {}\n  Reason: {source}", path.display())]
    FailedToReadFile {
        /// Path to the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input file is not a PDF and was not accepted for upload.
    #[error("Not a PDF file: {name} (detected type: {detected})")]
    NotAPdf {
        /// Display name of the rejected file.
        name: String,
        /// Mime type that was detected instead.
        detected: String,
    },

    /// A file could not be opened or one of its pages could not be rendered.
    #[error("Could not process the file \"{name}\". It might be corrupted or not a valid PDF.\n  Reason: {reason}")]
    RenderFailed {
        /// Display name of the file.
        name: String,
        /// Reason reported by the rasterizer.
        reason: String,
    },

    /// The rasterization backend could not be initialised.
    #[error("Rasterizer unavailable: {reason}")]
    RasterizerUnavailable {
        /// Why the backend could not be loaded.
        reason: String,
    },

    /// The combined document was requested for an empty page list.
    #[error("There are no pages to create a PDF")]
    EmptyPageList,

    /// A position does not exist in the page list.
    #[error("Invalid page position {index}: the page list has {len} page(s)")]
    InvalidPosition {
        /// Zero-based index that was requested.
        index: usize,
        /// Length of the page list at the time.
        len: usize,
    },

    /// The page list changed between observing it and editing it.
    #[error("Page list changed (expected version {expected}, found {actual}); refresh and retry")]
    StaleVersion {
        /// Version the caller observed.
        expected: u64,
        /// Version currently held by the session.
        actual: u64,
    },

    /// An edit operation could not be parsed.
    #[error("Invalid edit '{input}': {reason}")]
    InvalidEdit {
        /// The raw edit text.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Building the combined document failed.
    #[error("An error occurred while generating the PDF: {reason}\n  Please try again")]
    AssemblyFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read input list file.
    #[error("Failed to read input list file: {}\n  Reason: {source}", path.display())]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file contains invalid paths.
    #[error(
        "Invalid entry in input list file: {} at line {line_number}\n  Details: {details}",
        path.display()
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The operation was cancelled before it finished.
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for CollateError {
    fn from(err: lopdf::Error) -> Self {
        Self::assembly_failed(err.to_string())
    }
}

impl CollateError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAFile error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a RenderFailed error.
    pub fn render_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RenderFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a RasterizerUnavailable error.
    pub fn rasterizer_unavailable(reason: impl Into<String>) -> Self {
        Self::RasterizerUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an AssemblyFailed error.
    pub fn assembly_failed(reason: impl Into<String>) -> Self {
        Self::AssemblyFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidEdit error.
    pub fn invalid_edit(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEdit {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single file and processing can continue.
    ///
    /// Returns true for the errors an upload reports per file while the rest of
    /// the batch is still collected. Anything else is shown as an error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FileNotFound { .. }
                | Self::NotAFile { .. }
                | Self::FailedToReadFile { .. }
                | Self::NotAPdf { .. }
                | Self::RenderFailed { .. }
        )
    }

    /// Get the process exit code for this error.
    ///
    /// Unreadable inputs map to 2 and unusable PDFs to 3. An existing output is
    /// 4, write failures are 5, assembly failures are 6 and cancellation is
    /// 130. Everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadFile { .. } => 2,
            Self::NotAPdf { .. } => 3,
            Self::RenderFailed { .. } => 3,
            Self::RasterizerUnavailable { .. } => 3,
            Self::EmptyPageList => 1,
            Self::InvalidPosition { .. } => 1,
            Self::StaleVersion { .. } => 1,
            Self::InvalidEdit { .. } => 1,
            Self::AssemblyFailed { .. } => 6,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::FailedToReadInputList { .. } => 2,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
