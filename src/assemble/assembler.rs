//! Building the combined document from a page list.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use chrono::Utc;
use lopdf::{Document, Object, ObjectId, dictionary};
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::assemble::copier::PageCopier;
use crate::assemble::metadata::write_info;
use crate::config::Metadata;
use crate::error::{CollateError, Result};
use crate::model::{PageList, SourceFile, SourceId};

/// PDF version of the combined document.
const OUTPUT_VERSION: &str = "1.7";

/// Options for building the combined document.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Compress streams before serialising.
    pub compress: bool,
    /// Info dictionary fields.
    pub metadata: Metadata,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            compress: true,
            metadata: Metadata::default(),
        }
    }
}

/// Statistics about one assembly.
#[derive(Debug, Clone)]
pub struct AssemblyStatistics {
    /// Pages in the output.
    pub pages: usize,
    /// Distinct source files parsed.
    pub sources_parsed: usize,
    /// Time spent copying and serialising.
    pub assemble_time: Duration,
}

/// The serialised combined document.
#[derive(Debug, Clone)]
pub struct AssembledPdf {
    pub bytes: Vec<u8>,
    pub statistics: AssemblyStatistics,
}

/// Parsed source documents for a single assembly.
///
/// A cache lives exactly as long as one [`DocumentAssembler::assemble`] call:
/// it is created when the call starts and dropped when it returns. Each source
/// is parsed at most once per call, and nothing parsed survives into the next
/// call.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<SourceId, CachedSource>,
}

#[derive(Debug)]
struct CachedSource {
    document: Document,
    pages: BTreeMap<u32, ObjectId>,
    /// Source object id to output object id.
    id_map: HashMap<ObjectId, ObjectId>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sources parsed so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_or_parse(&mut self, source: &SourceFile) -> Result<&mut CachedSource> {
        if !self.entries.contains_key(&source.id()) {
            let document = Document::load_mem(source.bytes()).map_err(|e| {
                CollateError::assembly_failed(format!("cannot parse {}: {e}", source.name()))
            })?;
            debug!(file = source.name(), "Parsed source for assembly");

            let pages = document.get_pages();
            self.entries.insert(
                source.id(),
                CachedSource {
                    document,
                    pages,
                    id_map: HashMap::new(),
                },
            );
        }

        self.entries
            .get_mut(&source.id())
            .ok_or_else(|| CollateError::other("source cache entry vanished"))
    }
}

/// Turns a page list into one PDF byte stream.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    options: AssembleOptions,
}

impl DocumentAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: AssembleOptions) -> Self {
        Self { options }
    }

    /// Build the combined document on the blocking pool.
    ///
    /// Output page N is a copy of the source page of record N. The list and the
    /// sources are not modified.
    ///
    /// # Errors
    ///
    /// - [`CollateError::EmptyPageList`] if `list` is empty; nothing is done.
    /// - [`CollateError::AssemblyFailed`] if any source cannot be parsed, a
    ///   page index does not exist, or serialisation fails. No partial output
    ///   is produced.
    /// - [`CollateError::Cancelled`] if `cancel` fires before the last page is
    ///   copied.
    pub async fn assemble(
        &self,
        list: &PageList,
        cancel: &CancellationToken,
    ) -> Result<AssembledPdf> {
        if list.is_empty() {
            return Err(CollateError::EmptyPageList);
        }

        let list = list.clone();
        let options = self.options.clone();
        let cancel = cancel.clone();

        task::spawn_blocking(move || assemble_blocking(&list, &options, &cancel))
            .await
            .map_err(|e| CollateError::assembly_failed(format!("assembly stopped: {e}")))?
    }
}

/// Synchronous body of [`DocumentAssembler::assemble`].
pub fn assemble_blocking(
    list: &PageList,
    options: &AssembleOptions,
    cancel: &CancellationToken,
) -> Result<AssembledPdf> {
    if list.is_empty() {
        return Err(CollateError::EmptyPageList);
    }

    let start = Instant::now();
    let mut cache = SourceCache::new();
    let mut output = build_document(list, &mut cache, cancel, |copied, total| {
        debug!(copied, total, "Copied page");
    })?;

    write_info(&mut output, &options.metadata, Utc::now());

    if options.compress {
        output.compress();
    }

    let mut bytes = Vec::new();
    output
        .save_to(&mut bytes)
        .map_err(|e| CollateError::assembly_failed(format!("cannot serialise document: {e}")))?;

    let statistics = AssemblyStatistics {
        pages: list.len(),
        sources_parsed: cache.len(),
        assemble_time: start.elapsed(),
    };

    info!(
        pages = statistics.pages,
        sources = statistics.sources_parsed,
        bytes = bytes.len(),
        "Assembled document"
    );

    Ok(AssembledPdf { bytes, statistics })
}

/// Copy every listed page, in order, into a new document with a single flat
/// page tree.
///
/// # Arguments
///
/// * `list` - Pages to copy, in output order
/// * `cache` - Parsed sources for this assembly
/// * `cancel` - Checked before every page
/// * `on_page` - Called with `(copied, total)` after each page is copied
fn build_document<F>(
    list: &PageList,
    cache: &mut SourceCache,
    cancel: &CancellationToken,
    mut on_page: F,
) -> Result<Document>
where
    F: FnMut(usize, usize),
{
    let mut output = Document::with_version(OUTPUT_VERSION);
    let pages_id = output.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(list.len());

    for record in list.iter() {
        if cancel.is_cancelled() {
            return Err(CollateError::Cancelled);
        }

        let source = record.source();
        let cached = cache.get_or_parse(source)?;

        let page_number = record.source_page_index() + 1;
        let page_id = u32::try_from(page_number)
            .ok()
            .and_then(|n| cached.pages.get(&n).copied())
            .ok_or_else(|| {
                CollateError::assembly_failed(format!(
                    "{} has no page {page_number} ({} page(s))",
                    source.name(),
                    cached.pages.len()
                ))
            })?;

        let new_id = PageCopier::new(&cached.document, &mut cached.id_map)
            .copy_page(&mut output, page_id, pages_id)?;
        kids.push(new_id.into());
        on_page(kids.len(), list.len());
    }

    let count = kids.len() as i64;
    output.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = output.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    output.trailer.set("Root", catalog_id);

    Ok(output)
}
