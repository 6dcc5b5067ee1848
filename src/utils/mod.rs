//! Small helpers shared across modules: glob expansion, page-tree attribute
//! lookup and size formatting.

use std::path::PathBuf;

use lopdf::{Document, Object, ObjectId};

use crate::error::{CollateError, Result};

/// US Letter in PDF points, used when a page carries no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Page-tree attributes a page may inherit from its ancestors.
pub const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Expand glob patterns into filesystem paths.
///
/// Patterns that match nothing are passed through unchanged so that the caller
/// can report the missing file by name.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();
        let paths = collect_paths_for_pattern(pattern)?;
        if paths.is_empty() {
            resolved_paths.push(PathBuf::from(pattern));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| {
        CollateError::invalid_config(format!("Invalid glob pattern '{pattern}': {err}"))
    })?;

    for entry in paths {
        let path = entry.map_err(|err| CollateError::other(err.to_string()))?;
        resolved_paths.push(path);
    }

    resolved_paths.sort();
    Ok(resolved_paths)
}

/// Follow a reference to the object it points at. Non-references are returned
/// as they are.
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up `key` on the page dictionary, walking up the `Parent` chain when the
/// page itself does not define it. References are returned unresolved.
pub fn inherited_entry<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }

    None
}

/// Like [`inherited_entry`], with a top-level reference resolved.
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    resolve(doc, inherited_entry(doc, page_id, key)?)
}

/// Width and height of a page in points, from its (possibly inherited) MediaBox.
pub fn page_size(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let Some(Object::Array(media_box)) = inherited_attribute(doc, page_id, b"MediaBox") else {
        return DEFAULT_PAGE_SIZE;
    };

    let coords: Vec<f32> = media_box
        .iter()
        .filter_map(|value| resolve(doc, value)?.as_float().ok())
        .collect();

    match coords.as_slice() {
        [x0, y0, x1, y1] => {
            let width = (x1 - x0).abs();
            let height = (y1 - y0).abs();
            if width > 0.0 && height > 0.0 {
                (width, height)
            } else {
                DEFAULT_PAGE_SIZE
            }
        }
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;
    use tempfile::TempDir;

    /// Page tree where the MediaBox lives on the Pages node, not the page.
    fn document_with_inherited_media_box() -> (Document, ObjectId) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 420.into(), 595.into()],
                "Rotate" => 90,
            }),
        );
        (doc, page_id)
    }

    #[test]
    fn test_inherited_attribute_walks_parents() {
        let (doc, page_id) = document_with_inherited_media_box();

        let rotate = inherited_attribute(&doc, page_id, b"Rotate").unwrap();
        assert_eq!(rotate.as_i64().unwrap(), 90);
        assert!(inherited_attribute(&doc, page_id, b"CropBox").is_none());
    }

    #[test]
    fn test_page_size_uses_inherited_media_box() {
        let (doc, page_id) = document_with_inherited_media_box();
        assert_eq!(page_size(&doc, page_id), (420.0, 595.0));
    }

    #[test]
    fn test_page_size_defaults_without_media_box() {
        let mut doc = Document::with_version("1.5");
        let page_id = doc.add_object(dictionary! { "Type" => "Page" });
        assert_eq!(page_size(&doc, page_id), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_collect_paths_expands_globs() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt"] {
            std::fs::write(temp_dir.path().join(name), b"x").unwrap();
        }

        let pattern = format!("{}/*.pdf", temp_dir.path().display());
        let paths = collect_paths_for_patterns([pattern]).unwrap();

        assert_eq!(
            paths,
            vec![temp_dir.path().join("a.pdf"), temp_dir.path().join("b.pdf")]
        );
    }

    #[test]
    fn test_collect_paths_keeps_unmatched_pattern() {
        let paths = collect_paths_for_patterns(["/definitely/missing/file.pdf"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("/definitely/missing/file.pdf")]);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(100), "100 bytes");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1024 * 1024), "1.00 MB");
        assert_eq!(format_file_size(1536 * 1024), "1.50 MB");
    }
}
