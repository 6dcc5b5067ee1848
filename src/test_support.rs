//! PDF fixtures generated in memory for unit tests.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

/// Build a PDF with `pages` letter-sized pages.
pub fn pdf_bytes(pages: usize) -> Vec<u8> {
    labeled_pdf_bytes("doc", pages)
}

/// Build a PDF whose page N shows the text `"{label} page N"`.
///
/// Font resources and the MediaBox sit on the Pages node so that copying a page
/// has to pick them up from its parent.
pub fn labeled_pdf_bytes(label: &str, pages: usize) -> Vec<u8> {
    build_pdf(label, pages, (612, 792))
}

/// Build a one-page PDF with a `width` x `height` point MediaBox.
pub fn sized_pdf_bytes(width: i64, height: i64) -> Vec<u8> {
    build_pdf("sized", 1, (width, height))
}

fn build_pdf(label: &str, pages: usize, (width, height): (i64, i64)) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids: Vec<Object> = Vec::new();
    for i in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("{label} page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
