//! Output formatting and display for pdfcollate.
//!
//! Everything the user sees on the terminal goes through
//! [`OutputFormatter`]; the helpers here render the reports produced by the
//! session.

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::assemble::AssemblyStatistics;
use crate::error::CollateError;
use crate::model::PageList;
use crate::session::UploadReport;
use crate::utils::format_file_size;

/// Show what an upload added and every file that was left out.
pub fn display_upload_report(formatter: &OutputFormatter, report: &UploadReport) {
    for rejected in &report.rejected {
        report_problem(formatter, &rejected.error);
    }
    for skipped in &report.skipped {
        report_problem(formatter, &skipped.error);
    }

    formatter.info(&format!(
        "Loaded {} file(s): {} page(s)",
        report.files_accepted.saturating_sub(report.skipped.len()),
        report.pages_added
    ));

    if report.has_warnings() {
        formatter.warning(&format!(
            "{} file(s) were left out",
            report.rejected.len() + report.skipped.len()
        ));
    }
}

/// Level a left-out file is reported at. Per-file problems are warnings;
/// anything that points at a broken setup is an error.
pub fn problem_level(error: &CollateError) -> MessageLevel {
    if error.is_recoverable() {
        MessageLevel::Warning
    } else {
        MessageLevel::Error
    }
}

fn report_problem(formatter: &OutputFormatter, error: &CollateError) {
    match problem_level(error) {
        MessageLevel::Error => formatter.error(&error.to_string()),
        _ => formatter.warning(&error.to_string()),
    }
}

/// List the pages in output order, one numbered line each.
pub fn display_page_order(formatter: &OutputFormatter, list: &PageList) {
    formatter.section(&format!("Page order ({} page(s))", list.len()));
    for (index, record) in list.iter().enumerate() {
        formatter.list_item(index + 1, &record.label());
        formatter.detail("id", &record.id().to_string());
    }
}

/// Verbose summary of an assembly.
pub fn display_assembly_statistics(
    formatter: &OutputFormatter,
    stats: &AssemblyStatistics,
    output_size: u64,
) {
    if !formatter.is_verbose() {
        return;
    }

    formatter.section("Statistics");
    formatter.detail("Pages", &stats.pages.to_string());
    formatter.detail("Source files", &stats.sources_parsed.to_string());
    formatter.detail(
        "Assembly time",
        &format!("{:.2}s", stats.assemble_time.as_secs_f64()),
    );
    formatter.detail("Output size", &format_file_size(output_size));
}
