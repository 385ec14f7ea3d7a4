//! Copying pages between documents
//!
//! A copied page keeps its content streams and resources but is detached
//! from the source page tree: `/Parent` is never followed, and inherited
//! attributes are written onto the page itself.

use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Maps source object ids to their copies in one output document.
///
/// Source pages are tracked apart from other objects. A reference to a page
/// (a link destination, say) resolves to that page's first copy in this
/// output, or to null when the page is not part of it.
pub(crate) struct CopyCache {
    objects: HashMap<ObjectId, ObjectId>,
    pages: HashMap<ObjectId, Option<ObjectId>>,
}

impl CopyCache {
    pub(crate) fn new(source_pages: &[ObjectId]) -> Self {
        Self {
            objects: HashMap::new(),
            pages: source_pages.iter().map(|&id| (id, None)).collect(),
        }
    }

    /// Record where a source page lands; only its first copy is kept
    pub(crate) fn place_page(&mut self, source_page: ObjectId, output_page: ObjectId) {
        if let Some(slot) = self.pages.get_mut(&source_page) {
            slot.get_or_insert(output_page);
        }
    }
}

/// Copy a page into `output` under the already reserved id `new_page_id`.
///
/// Every call creates a new page dictionary, so copying the same source page
/// twice gives two independent pages. Shared resources (fonts, images) are
/// copied once per output document through `cache`.
pub(crate) fn copy_page(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    new_page_id: ObjectId,
    parent_id: ObjectId,
    cache: &mut CopyCache,
) -> Result<()> {
    let page_dict = source.get_dictionary(page_id)?;

    let mut new_page = Dictionary::new();
    for (key, value) in page_dict.iter() {
        if key.as_slice() == b"Parent" {
            continue;
        }
        new_page.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }

    for key in INHERITABLE_KEYS {
        if new_page.has(key) {
            continue;
        }
        if let Some(inherited) = find_inherited(source, page_dict, key) {
            new_page.set(key.to_vec(), copy_object_deep(output, source, inherited, cache)?);
        }
    }

    new_page.set("Parent", Object::Reference(parent_id));
    output.objects.insert(new_page_id, Object::Dictionary(new_page));
    Ok(())
}

/// Walk up the page tree looking for an inherited attribute
fn find_inherited<'a>(source: &'a Document, page: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = page;
    // Bounded to guard against malformed trees with a /Parent cycle
    for _ in 0..64 {
        let parent_id = current.get(b"Parent").and_then(Object::as_reference).ok()?;
        let parent = source.get_dictionary(parent_id).ok()?;
        if let Ok(value) = parent.get(key) {
            return Some(value);
        }
        current = parent;
    }
    None
}

/// Deep copy an object from source to output document, following references.
///
/// The target id is reserved before the referenced object is copied, so
/// reference cycles terminate. A reference to an undefined object copies as
/// null; any other read failure is an error.
pub(crate) fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut CopyCache,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&placed) = cache.pages.get(id) {
                return Ok(placed.map_or(Object::Null, Object::Reference));
            }
            if let Some(&new_id) = cache.objects.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.objects.insert(*id, new_id);

            let copied = match source.get_object(*id) {
                Ok(referenced) => copy_object_deep(output, source, referenced, cache)?,
                Err(lopdf::Error::ObjectNotFound(missing)) => {
                    log::debug!("reference to undefined object {missing:?} copied as null");
                    Object::Null
                }
                Err(err) => return Err(err.into()),
            };
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        _ => Ok(obj.clone()),
    }
}

/// Annotations keep `/Parent` (a form field) but lose `/P`; other
/// dictionaries lose `/Parent`, which would pull in a source tree.
fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut CopyCache,
) -> Result<Dictionary> {
    let annotation = is_annotation(dict);

    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        let skip = match key.as_slice() {
            b"Parent" => !annotation,
            b"P" => annotation,
            _ => false,
        };
        if skip {
            continue;
        }
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

/// `/Type /Annot` is optional, so an untyped dictionary with `/Subtype` and `/Rect` counts too
fn is_annotation(dict: &Dictionary) -> bool {
    match dict.get(b"Type").and_then(Object::as_name) {
        Ok(name) => name == b"Annot",
        Err(_) => dict.has(b"Subtype") && dict.has(b"Rect"),
    }
}
