//! Page list data model.
//!
//! - [`PageRecord`]: one page of an uploaded file, with its preview image
//! - [`SourceFile`]: the uploaded bytes a record points into
//! - [`PageList`]: the ordered sequence that becomes the combined document

pub mod list;
pub mod page;

pub use list::PageList;
pub use page::{PageId, PageRecord, PreviewImage, SourceFile, SourceId};
