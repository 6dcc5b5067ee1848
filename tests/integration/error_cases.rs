//! Bad inputs and refused operations.

use pdfcollate::CollateError;
use tempfile::TempDir;

use crate::common::{labeled_pdf, placeholder_session, write_file, write_pdf};

#[tokio::test]
async fn test_corrupt_file_is_skipped_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    let corrupt = write_file(temp_dir.path(), "broken.pdf", b"%PDF-1.4 this is not a pdf");
    let valid = write_pdf(temp_dir.path(), "valid", 2);
    let session = placeholder_session();

    let report = session.upload(&[corrupt, valid]).await.unwrap();

    assert_eq!(report.pages_added, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].file_name, "broken.pdf");
    assert!(report.skipped[0].to_string().contains("broken.pdf"));
    assert_eq!(session.snapshot().await.len(), 2);
}

#[tokio::test]
async fn test_non_pdf_files_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let notes = write_file(temp_dir.path(), "notes.txt", b"plain text");
    let image = write_file(temp_dir.path(), "photo.png", &[0x89, b'P', b'N', b'G']);
    let valid = write_pdf(temp_dir.path(), "valid", 1);
    let session = placeholder_session();

    let report = session.upload(&[notes, valid, image]).await.unwrap();

    assert_eq!(report.files_accepted, 1);
    assert_eq!(report.pages_added, 1);
    assert_eq!(report.rejected.len(), 2);
    assert!(
        report
            .rejected
            .iter()
            .all(|warning| matches!(warning.error, CollateError::NotAPdf { .. }))
    );
}

#[tokio::test]
async fn test_missing_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();

    let report = session
        .upload(&[temp_dir.path().join("gone.pdf")])
        .await
        .unwrap();

    assert_eq!(report.pages_added, 0);
    assert!(matches!(
        report.rejected[0].error,
        CollateError::FileNotFound { .. }
    ));
}

#[tokio::test]
async fn test_empty_list_cannot_be_assembled() {
    let err = placeholder_session().assemble().await.unwrap_err();

    assert!(matches!(err, CollateError::EmptyPageList));
    assert_eq!(err.to_string(), "There are no pages to create a PDF");
}

#[tokio::test]
async fn test_deleting_everything_leaves_nothing_to_assemble() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[write_pdf(temp_dir.path(), "only", 1)])
        .await
        .unwrap();

    let version = session.version().await;
    session.delete_at(0, version).await.unwrap();

    assert!(matches!(
        session.assemble().await.unwrap_err(),
        CollateError::EmptyPageList
    ));
}

#[tokio::test]
async fn test_source_changed_on_disk_does_not_matter() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_pdf(temp_dir.path(), "volatile", 2);
    let session = placeholder_session();
    session.upload(std::slice::from_ref(&path)).await.unwrap();

    std::fs::write(&path, labeled_pdf("other", 1)).unwrap();

    let pdf = session.assemble().await.unwrap();
    assert_eq!(pdf.statistics.pages, 2);
}

#[tokio::test]
async fn test_stale_edit_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[write_pdf(temp_dir.path(), "a", 3)])
        .await
        .unwrap();
    let observed = session.version().await;

    session
        .upload(&[write_pdf(temp_dir.path(), "b", 1)])
        .await
        .unwrap();

    let err = session.move_page(0, 2, observed).await.unwrap_err();
    assert!(matches!(err, CollateError::StaleVersion { .. }));
    assert_eq!(session.snapshot().await.len(), 4);
}

#[tokio::test]
async fn test_cancelled_session_refuses_work() {
    let temp_dir = TempDir::new().unwrap();
    let session = placeholder_session();
    session
        .upload(&[write_pdf(temp_dir.path(), "a", 1)])
        .await
        .unwrap();

    session.cancel_all();

    assert!(matches!(
        session.assemble().await.unwrap_err(),
        CollateError::Cancelled
    ));
}
