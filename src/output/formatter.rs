//! Message formatting and display.
//!
//! This module provides formatted output for different message types with
//! support for quiet and verbose modes.
//!
//! # Examples
//!
//! ```
//! use pdfcollate::output::OutputFormatter;
//!
//! let formatter = OutputFormatter::new(false, false);
//! formatter.info("Rendering previews...");
//! formatter.success("Created combined_document.pdf");
//! ```

use std::io::{self, IsTerminal, Write};

use crate::config::Config;

/// Level of output message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    /// Informational message.
    Info,
    /// Success message.
    Success,
    /// Warning message, such as a file that was left out.
    Warning,
    /// Error message.
    Error,
    /// Debug/verbose message.
    Debug,
}

impl MessageLevel {
    fn prefix(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "✓ ",
            Self::Warning => "⚠ ",
            Self::Error => "✗ ",
            Self::Debug => "→ ",
        }
    }

    fn color(self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Success => "\x1b[32m",
            Self::Warning => "\x1b[33m",
            Self::Error => "\x1b[31m",
            Self::Debug => "\x1b[36m",
        }
    }

    /// Warnings and errors go to stderr so stdout stays clean for the page
    /// listing.
    fn to_stderr(self) -> bool {
        matches!(self, Self::Warning | Self::Error)
    }
}

/// User-facing output with quiet and verbose modes.
///
/// Quiet mode keeps warnings and errors. Verbose mode adds debug lines and
/// details.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    /// Whether to suppress non-error output.
    quiet: bool,
    /// Whether to show verbose output.
    verbose: bool,
    /// Whether to use colored output.
    colored: bool,
}

impl OutputFormatter {
    /// Create a new output formatter.
    ///
    /// Colors are used when stdout is a TTY and `TERM` is set.
    ///
    /// # Arguments
    ///
    /// * `quiet` - Suppress non-error output
    /// * `verbose` - Show verbose output
    pub fn new(quiet: bool, verbose: bool) -> Self {
        Self {
            quiet,
            verbose,
            colored: io::stdout().is_terminal() && std::env::var("TERM").is_ok(),
        }
    }

    /// Create a formatter from configuration.
    ///
    /// A dry run prints its page order even when quiet.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration containing output settings
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.quiet && !config.dry_run, config.verbose)
    }

    /// Create a quiet formatter (warnings and errors only).
    pub fn quiet() -> Self {
        Self::new(true, false)
    }

    pub fn verbose() -> Self {
        Self::new(false, true)
    }

    /// Print an informational message.
    ///
    /// Suppressed in quiet mode.
    ///
    /// # Arguments
    ///
    /// * `message` - Message to display
    pub fn info(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Info, message);
        }
    }

    /// Suppressed in quiet mode.
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.print_message(MessageLevel::Success, message);
        }
    }

    /// Print a warning message to stderr.
    ///
    /// Always displayed (even in quiet mode).
    ///
    /// # Arguments
    ///
    /// * `message` - Message to display
    pub fn warning(&self, message: &str) {
        self.print_message(MessageLevel::Warning, message);
    }

    /// Print an error message to stderr. Always displayed.
    pub fn error(&self, message: &str) {
        self.print_message(MessageLevel::Error, message);
    }

    /// Only displayed in verbose mode.
    pub fn debug(&self, message: &str) {
        if self.verbose {
            self.print_message(MessageLevel::Debug, message);
        }
    }

    fn print_message(&self, level: MessageLevel, message: &str) {
        let line = if self.colored && !level.color().is_empty() {
            format!("{}{}{message}\x1b[0m", level.color(), level.prefix())
        } else {
            format!("{}{message}", level.prefix())
        };

        if level.to_stderr() {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    /// Print a section header. Suppressed in quiet mode.
    pub fn section(&self, title: &str) {
        if !self.quiet {
            println!("\n{title}");
        }
    }

    /// Print detailed information as `label: value`.
    ///
    /// Only shown in verbose mode.
    ///
    /// # Arguments
    ///
    /// * `label` - Label for the information
    /// * `value` - Value to display
    pub fn detail(&self, label: &str, value: &str) {
        if self.verbose {
            println!("  {label}: {value}");
        }
    }

    /// Print a numbered line. Suppressed in quiet mode.
    ///
    /// # Arguments
    ///
    /// * `index` - One-based number shown in front of the line
    /// * `message` - Text of the line
    pub fn list_item(&self, index: usize, message: &str) {
        if !self.quiet {
            println!("  {index:>3}. {message}");
        }
    }

    pub fn blank_line(&self) {
        if !self.quiet {
            println!();
        }
    }

    /// Ask a yes/no question on stdout and read the answer from stdin.
    ///
    /// Anything other than `y` or `yes` counts as no.
    pub fn confirm(&self, question: &str) -> io::Result<bool> {
        print!("{question} [y/N]: ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().read_line(&mut response)?;

        let response = response.trim().to_lowercase();
        Ok(response == "y" || response == "yes")
    }

    pub fn should_print(&self) -> bool {
        !self.quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new(false, false)
    }
}
