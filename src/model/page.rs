//! Page records and the uploaded files they come from.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a page record within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(Uuid);

impl PageId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of an uploaded file. Used as the key when sources are parsed once
/// and shared between records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(Uuid);

impl SourceId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An uploaded PDF byte stream.
///
/// Cloning the bytes handle is O(1); several page records point at the same
/// source through an `Arc<SourceFile>`.
#[derive(Debug)]
pub struct SourceFile {
    id: SourceId,
    name: String,
    path: Option<PathBuf>,
    bytes: Arc<Vec<u8>>,
}

impl SourceFile {
    /// Wrap in-memory bytes under a display name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id: SourceId::new(),
            name: name.into(),
            path: None,
            bytes: Arc::new(bytes.into()),
        }
    }

    /// Wrap bytes read from `path`. The display name is the file name component.
    pub fn from_path(path: &Path, bytes: impl Into<Vec<u8>>) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            id: SourceId::new(),
            name,
            path: Some(path.to_path_buf()),
            bytes: Arc::new(bytes.into()),
        }
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// File name without its extension, used for thumbnail file names.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Encoded raster preview of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    mime_type: &'static str,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PreviewImage {
    /// JPEG mime type used for all generated previews.
    pub const JPEG: &'static str = "image/jpeg";

    pub fn jpeg(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            mime_type: Self::JPEG,
            width,
            height,
            data,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Render as a `data:` URL suitable for an `<img src>` attribute.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// One page pending inclusion in the combined document.
///
/// Records are immutable; a page changes position only through
/// [`PageList`](super::PageList) operations.
#[derive(Debug, Clone)]
pub struct PageRecord {
    id: PageId,
    source: Arc<SourceFile>,
    source_page_index: usize,
    preview: PreviewImage,
}

impl PageRecord {
    pub fn new(source: Arc<SourceFile>, source_page_index: usize, preview: PreviewImage) -> Self {
        Self {
            id: PageId::new(),
            source,
            source_page_index,
            preview,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn source(&self) -> &Arc<SourceFile> {
        &self.source
    }

    /// Zero-based page index within the source file.
    pub fn source_page_index(&self) -> usize {
        self.source_page_index
    }

    pub fn preview(&self) -> &PreviewImage {
        &self.preview
    }

    /// Human readable label such as `report.pdf p3`.
    pub fn label(&self) -> String {
        format!("{} p{}", self.source.name(), self.source_page_index + 1)
    }
}
