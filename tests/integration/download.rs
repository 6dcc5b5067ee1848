//! Writing the combined document to disk.

use chrono::{Local, TimeZone};
use lopdf::Document;
use pdfcollate::assemble::{AssembleOptions, DocumentAssembler};
use pdfcollate::assemble::metadata::read_info;
use pdfcollate::config::{Metadata, ThumbnailOptions};
use pdfcollate::io::{PdfWriter, default_output_path};
use pdfcollate::render::{PlaceholderRasterizer, ThumbnailRenderer};
use pdfcollate::session::Session;
use tempfile::TempDir;

use crate::common::{page_texts, placeholder_session, write_pdf};

#[tokio::test]
async fn test_download_to_generated_name() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[write_pdf(temp_dir.path(), "report", 2)])
        .await
        .unwrap();

    let now = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let output = default_output_path(temp_dir.path(), now).await;
    assert!(
        output
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("combined_document_20250102-030405")
    );

    let pdf = session.assemble().await.unwrap();
    let stats = PdfWriter::new().save(&pdf.bytes, &output).await.unwrap();

    assert_eq!(stats.file_size, pdf.bytes.len() as u64);
    let written = std::fs::read(&output).unwrap();
    assert_eq!(page_texts(&written), vec!["report page 1", "report page 2"]);

    let next = default_output_path(temp_dir.path(), now).await;
    assert_ne!(next, output);
}

#[tokio::test]
async fn test_download_carries_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let renderer =
        ThumbnailRenderer::new(Box::new(PlaceholderRasterizer), ThumbnailOptions::default());
    let assembler = DocumentAssembler::with_options(AssembleOptions {
        compress: false,
        metadata: Metadata::new(
            Some("Quarterly pack".to_string()),
            Some("Finance".to_string()),
            None,
            None,
        ),
    });
    let session = Session::new(renderer, assembler);
    session
        .upload(&[write_pdf(temp_dir.path(), "q1", 1)])
        .await
        .unwrap();

    let pdf = session.assemble().await.unwrap();
    let doc = Document::load_mem(&pdf.bytes).unwrap();
    let info = read_info(&doc);

    assert_eq!(info.title.as_deref(), Some("Quarterly pack"));
    assert_eq!(info.author.as_deref(), Some("Finance"));
}
