//! Upload, edit and assemble through a session.

use std::collections::HashSet;

use pdfcollate::io::{Manifest, export_thumbnails};
use tempfile::TempDir;

use crate::common::{page_texts, placeholder_session, write_pdf};

fn labels(list: &pdfcollate::model::PageList) -> Vec<String> {
    list.iter().map(|record| record.label()).collect()
}

#[tokio::test]
async fn test_upload_delete_move_assemble() {
    let temp_dir = TempDir::new().unwrap();
    let a = write_pdf(temp_dir.path(), "A", 3);
    let b = write_pdf(temp_dir.path(), "B", 2);
    let session = placeholder_session();

    session.upload(&[a]).await.unwrap();
    let report = session.upload(&[b]).await.unwrap();
    assert_eq!(report.pages_added, 2);

    let list = session.snapshot().await;
    assert_eq!(
        labels(&list),
        vec!["A.pdf p1", "A.pdf p2", "A.pdf p3", "B.pdf p1", "B.pdf p2"]
    );
    let unique: HashSet<_> = list.ids().into_iter().collect();
    assert_eq!(unique.len(), 5);

    let list = session.delete_at(1, list.version()).await.unwrap();
    assert_eq!(
        labels(&list),
        vec!["A.pdf p1", "A.pdf p3", "B.pdf p1", "B.pdf p2"]
    );

    let moved_id = list.get(2).unwrap().id();
    let list = session.move_page(2, 0, list.version()).await.unwrap();
    assert_eq!(
        labels(&list),
        vec!["B.pdf p1", "A.pdf p1", "A.pdf p3", "B.pdf p2"]
    );
    assert_eq!(list.position_of(moved_id), Some(0));

    let pdf = session.assemble().await.unwrap();
    assert_eq!(pdf.statistics.pages, 4);
    assert_eq!(pdf.statistics.sources_parsed, 2);
    assert_eq!(
        page_texts(&pdf.bytes),
        vec!["B page 1", "A page 1", "A page 3", "B page 2"]
    );
}

#[tokio::test]
async fn test_batch_upload_keeps_file_then_page_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        write_pdf(temp_dir.path(), "first", 2),
        write_pdf(temp_dir.path(), "second", 1),
        write_pdf(temp_dir.path(), "third", 3),
    ];
    let session = placeholder_session();

    let report = session.upload(&paths).await.unwrap();

    assert_eq!(report.files_accepted, 3);
    assert_eq!(report.pages_added, 6);
    assert!(!report.has_warnings());
    assert_eq!(
        labels(&session.snapshot().await),
        vec![
            "first.pdf p1",
            "first.pdf p2",
            "second.pdf p1",
            "third.pdf p1",
            "third.pdf p2",
            "third.pdf p3"
        ]
    );
}

#[tokio::test]
async fn test_assembling_twice_gives_same_pages() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[
            write_pdf(temp_dir.path(), "x", 2),
            write_pdf(temp_dir.path(), "y", 1),
        ])
        .await
        .unwrap();

    let first = session.assemble().await.unwrap();
    let second = session.assemble().await.unwrap();

    assert_eq!(page_texts(&first.bytes), page_texts(&second.bytes));
    assert_eq!(page_texts(&first.bytes), vec!["x page 1", "x page 2", "y page 1"]);
}

#[tokio::test]
async fn test_apply_edits_then_assemble() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[write_pdf(temp_dir.path(), "doc", 4)])
        .await
        .unwrap();

    let edits = vec!["delete:1".parse().unwrap(), "move:3:1".parse().unwrap()];
    session.apply_edits(&edits).await.unwrap();

    let pdf = session.assemble().await.unwrap();
    assert_eq!(
        page_texts(&pdf.bytes),
        vec!["doc page 4", "doc page 2", "doc page 3"]
    );
}

#[tokio::test]
async fn test_export_previews_and_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[write_pdf(temp_dir.path(), "scan", 2)])
        .await
        .unwrap();
    let list = session.snapshot().await;

    let thumbs = temp_dir.path().join("thumbs");
    let written = export_thumbnails(&list, &thumbs).await.unwrap();
    assert_eq!(written.len(), 2);
    assert!(thumbs.join("002-scan-p2.jpg").exists());

    let bytes = std::fs::read(&written[0]).unwrap();
    assert_eq!(&bytes[..2], &[0xff, 0xd8]);

    let manifest_path = temp_dir.path().join("pages.json");
    Manifest::from_list(&list, true, true)
        .write(&manifest_path)
        .await
        .unwrap();

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&manifest_path).unwrap()).unwrap();
    let pages = manifest["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1]["source"], "scan.pdf");
    assert_eq!(pages[1]["page"], 2);
    // Placeholder previews are half the 300x400 page size.
    assert_eq!(pages[0]["width"], 150);
    assert_eq!(pages[0]["height"], 200);
    assert!(
        pages[0]["preview"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,")
    );
}
