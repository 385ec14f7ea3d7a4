//! Building output documents from an index sequence
//!
//! This module turns a resolved page order into new PDF documents:
//! 1. Partition the sequence at the split markers
//! 2. Copy each segment's pages, in order, into a fresh document
//! 3. Name the outputs after the source
//!
//! The source document is only read. Every output document owns its
//! objects, so outputs can be edited independently of each other.

mod copy;
mod io;
mod split;

pub use io::{load_source, save_outputs};
pub use split::SplitMarkers;

use crate::types::*;
use copy::{CopyCache, copy_page};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::{Path, PathBuf};

/// PDF version written when the source does not declare one
const DEFAULT_PDF_VERSION: &str = "1.7";

/// A parsed PDF that pages are copied from
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    document: Document,
    /// Set when loaded from disk
    origin: Option<PathBuf>,
}

impl SourceDocument {
    /// Parse a document from memory
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let document = Document::load_mem(bytes)?;
        Ok(Self::new(name, document))
    }

    pub fn new(name: impl Into<String>, document: Document) -> Self {
        Self {
            name: name.into(),
            document,
            origin: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Page object ids in page order
    fn page_ids(&self) -> Vec<ObjectId> {
        self.document.get_pages().into_values().collect()
    }
}

/// A document produced by [`materialize`]
#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub name: String,
    pub document: Document,
    /// Path of the source file; [`save_outputs`] never writes over it
    origin: Option<PathBuf>,
}

impl OutputDocument {
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Serialize to PDF bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut document = self.document.clone();
        let mut writer = Vec::new();
        document.save_to(&mut writer)?;
        Ok(writer)
    }
}

/// Build output documents off the async runtime.
///
/// The inputs are cloned into a blocking task, so dropping the returned
/// future never exposes a half-built document.
pub async fn materialize(
    source: &SourceDocument,
    sequence: &[PageIndex],
    markers: &SplitMarkers,
) -> Result<Vec<OutputDocument>> {
    let source = source.clone();
    let sequence = sequence.to_vec();
    let markers = markers.clone();

    tokio::task::spawn_blocking(move || materialize_sync(&source, &sequence, &markers)).await?
}

/// Build one output document per segment of `sequence`.
///
/// Without effective split markers a single document named like the source
/// is produced; otherwise segment `N` is named `<stem>_part_<N>.pdf`.
/// Indices past the end of the source are skipped.
pub fn materialize_sync(
    source: &SourceDocument,
    sequence: &[PageIndex],
    markers: &SplitMarkers,
) -> Result<Vec<OutputDocument>> {
    let page_ids = source.page_ids();
    let segments = markers.segments(sequence);
    let split = segments.len() > 1;

    log::debug!(
        "materializing {} page(s) from '{}' into {} document(s)",
        sequence.len(),
        source.name,
        segments.len()
    );

    segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| -> Result<OutputDocument> {
            let document = build_document(&source.document, &page_ids, segment)?;
            let name = if split {
                part_name(&source.name, idx + 1)
            } else {
                source.name.clone()
            };
            Ok(OutputDocument {
                name,
                document,
                origin: source.origin.clone(),
            })
        })
        .collect()
}

/// Copy the pages of one segment into a new document
fn build_document(
    source: &Document,
    page_ids: &[ObjectId],
    segment: &[PageIndex],
) -> Result<Document> {
    let version = if source.version.is_empty() {
        DEFAULT_PDF_VERSION
    } else {
        source.version.as_str()
    };
    let mut output = Document::with_version(version);
    let pages_tree_id = output.new_object_id();
    let mut cache = CopyCache::new(page_ids);

    // Reserve every page id first so links between pages of this output resolve
    let mut placed = Vec::with_capacity(segment.len());
    for &idx in segment {
        let Some(&page_id) = page_ids.get(idx) else {
            log::debug!(
                "skipping page index {idx}: source has {} page(s)",
                page_ids.len()
            );
            continue;
        };
        let new_page_id = output.new_object_id();
        cache.place_page(page_id, new_page_id);
        placed.push((page_id, new_page_id));
    }

    let mut page_refs = Vec::with_capacity(placed.len());
    for (page_id, new_page_id) in placed {
        copy_page(&mut output, source, page_id, new_page_id, pages_tree_id, &mut cache)?;
        page_refs.push(Object::Reference(new_page_id));
    }

    finalize_document(&mut output, pages_tree_id, page_refs);
    Ok(output)
}

/// Hang the copied pages under a single flat page tree and point a new
/// catalog at it. Outlines and the source catalog are not carried over.
fn finalize_document(output: &mut Document, pages_tree_id: ObjectId, page_refs: Vec<Object>) {
    let count = page_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(count)),
        ("Kids", Object::Array(page_refs)),
    ]);
    output
        .objects
        .insert(pages_tree_id, Object::Dictionary(pages_dict));

    let catalog = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_tree_id)),
    ]);
    let catalog_id = output.add_object(catalog);
    output.trailer.set("Root", Object::Reference(catalog_id));
}

/// `report.pdf` -> `report_part_2.pdf`
fn part_name(source_name: &str, part: usize) -> String {
    let path = Path::new(source_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("document");
    format!("{stem}_part_{part}.pdf")
}
