//! pdfcollate - Collect pages from PDF files into a single document.

mod cli;

use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use pdfcollate::config::{Config, OverwriteMode};
use pdfcollate::error::CollateError;
use pdfcollate::io::{Manifest, PdfWriter, default_output_path, export_thumbnails};
use pdfcollate::output::{
    OutputFormatter, display_assembly_statistics, display_page_order, display_upload_report,
};
use pdfcollate::session::Session;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or info with --verbose.
fn init_tracing(verbose: bool) {
    let default = if verbose { "pdfcollate=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), CollateError> {
    cli.validate()?;

    let all_inputs = cli.get_all_inputs().await?;
    let mut config = cli.to_config()?;
    config.inputs = all_inputs;
    config
        .validate()
        .map_err(|e| CollateError::invalid_config(format!("{e:#}")))?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfcollate::NAME, pdfcollate::VERSION));
        formatter.blank_line();
    }

    let session = Session::from_config(&config)?;
    formatter.debug(&format!("Preview renderer: {}", session.renderer().backend()));

    formatter.info(&format!("Rendering {} file(s)...", config.inputs.len()));
    let report = session.upload(&config.inputs).await?;
    display_upload_report(&formatter, &report);

    if !config.edits.is_empty() {
        let list = session.apply_edits(&config.edits).await?;
        formatter.info(&format!(
            "Applied {} edit(s): {} page(s) left",
            config.edits.len(),
            list.len()
        ));
    }

    let list = session.snapshot().await;

    if let Some(dir) = &config.thumbnails_dir
        && !config.dry_run
    {
        let written = export_thumbnails(&list, dir).await?;
        formatter.info(&format!(
            "Wrote {} preview(s) to {}",
            written.len(),
            dir.display()
        ));
    }

    if let Some(path) = &config.manifest
        && !config.dry_run
    {
        Manifest::from_list(&list, config.embed_previews, config.thumbnails_dir.is_some())
            .write(path)
            .await?;
        formatter.info(&format!("Wrote manifest to {}", path.display()));
    }

    if config.dry_run {
        display_page_order(&formatter, &list);
        formatter.blank_line();
        formatter.success("Dry run completed successfully");
        if let Some(output) = &config.output {
            formatter.info(&format!("  Output would be: {}", output.display()));
        }
        formatter.info("  Run without --dry-run to create the combined PDF");
        return Ok(());
    }

    if list.is_empty() {
        return Err(CollateError::EmptyPageList);
    }

    if formatter.is_verbose() {
        display_page_order(&formatter, &list);
    }

    let output = resolve_output_path(&config).await?;
    let writer = PdfWriter::new();
    writer.can_write(&output).await?;
    handle_output_overwrite(&config, &output, &formatter).await?;

    formatter.info("Generating PDF...");
    let pdf = session.assemble().await?;

    formatter.info(&format!("Writing to: {}", output.display()));
    let write_stats = writer.save(&pdf.bytes, &output).await?;

    if formatter.should_print() {
        formatter.blank_line();
        formatter.success(&format!(
            "Created {} ({} page(s), {})",
            write_stats.output_path.display(),
            pdf.statistics.pages,
            write_stats.format_file_size()
        ));
        display_assembly_statistics(&formatter, &pdf.statistics, write_stats.file_size);
        formatter.detail(
            "Write time",
            &format!("{:.2}s", write_stats.write_time.as_secs_f64()),
        );
    }

    Ok(())
}

/// The explicit output path, or a fresh generated name in the working
/// directory.
async fn resolve_output_path(config: &Config) -> Result<PathBuf, CollateError> {
    match &config.output {
        Some(path) => Ok(path.clone()),
        None => {
            let dir = std::env::current_dir()?;
            Ok(default_output_path(&dir, Local::now()).await)
        }
    }
}

/// Handle output file overwrite scenarios.
async fn handle_output_overwrite(
    config: &Config,
    output: &Path,
    formatter: &OutputFormatter,
) -> Result<(), CollateError> {
    if !PdfWriter::new().exists(output).await {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(CollateError::output_exists(output.to_path_buf())),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                return Err(CollateError::output_exists(output.to_path_buf()));
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));

            let confirmed = formatter
                .confirm("Overwrite?")
                .map_err(|err| CollateError::other(format!("Failed to read input: {err}")))?;

            if confirmed {
                Ok(())
            } else {
                Err(CollateError::Cancelled)
            }
        }
    }
}
