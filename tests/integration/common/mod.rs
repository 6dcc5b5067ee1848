//! Shared helpers for the integration tests.
//!
//! Fixtures are generated with lopdf and previews come from the placeholder
//! rasterizer, so no native library or checked-in PDF is needed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use pdfcollate::assemble::DocumentAssembler;
use pdfcollate::config::ThumbnailOptions;
use pdfcollate::render::{PlaceholderRasterizer, ThumbnailRenderer};
use pdfcollate::session::Session;

/// Write a PDF named `{label}.pdf` into `dir` whose page N shows
/// `"{label} page N"`.
pub fn write_pdf(dir: &Path, label: &str, pages: usize) -> PathBuf {
    let path = dir.join(format!("{label}.pdf"));
    std::fs::write(&path, labeled_pdf(label, pages)).expect("Failed to write fixture");
    path
}

/// Write arbitrary bytes under `name`.
pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write fixture");
    path
}

pub fn labeled_pdf(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = (1..=pages)
        .map(|n| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
                    Operation::new("Td", vec![50.into(), 50.into()]),
                    Operation::new(
                        "Tj",
                        vec![Object::string_literal(format!("{label} page {n}"))],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("Failed to encode content"),
            ));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to save fixture");
    bytes
}

/// Session with placeholder previews and default assembly options.
pub fn placeholder_session() -> Session {
    let renderer =
        ThumbnailRenderer::new(Box::new(PlaceholderRasterizer), ThumbnailOptions::default());
    Session::new(renderer, DocumentAssembler::new())
}

/// The text shown on each page of `bytes`, in page order.
pub fn page_texts(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).expect("Output is not a valid PDF");
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).expect("Page has no content");
            let content = Content::decode(&content).expect("Content cannot be decoded");
            content
                .operations
                .iter()
                .find(|op| op.operator == "Tj")
                .and_then(|op| op.operands.first())
                .and_then(|operand| operand.as_str().ok())
                .map(|text| String::from_utf8_lossy(text).into_owned())
                .unwrap_or_default()
        })
        .collect()
}
