//! Deep copy of single pages between `lopdf` documents.
//!
//! A page is copied together with everything it references: content streams,
//! resources, fonts, images, annotations. Object ids are remapped into the
//! target's id space. The id map is kept per source, so objects shared by
//! several pages of one source (a font, a logo) are imported once.
//!
//! A page that is copied a second time gets a private id map. Its annotations
//! and everything else it references are imported again, so no two output
//! pages share an annotation.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::error::{CollateError, Result};
use crate::utils::{INHERITABLE_KEYS, inherited_entry};

/// Copies pages out of one source document.
#[derive(Debug)]
pub struct PageCopier<'s> {
    source: &'s Document,
    id_map: &'s mut HashMap<ObjectId, ObjectId>,
}

impl<'s> PageCopier<'s> {
    /// `id_map` maps source ids to target ids and must only ever be used with
    /// this `source` and one target.
    pub fn new(source: &'s Document, id_map: &'s mut HashMap<ObjectId, ObjectId>) -> Self {
        Self { source, id_map }
    }

    /// Copy the page `page_id` into `target` as a child of `parent`.
    ///
    /// Inheritable attributes are written onto the copy so that it renders
    /// the same under its new parent.
    ///
    /// Returns the id of the new page object.
    pub fn copy_page(
        &mut self,
        target: &mut Document,
        page_id: ObjectId,
        parent: ObjectId,
    ) -> Result<ObjectId> {
        let source = self.source;
        let page = source.get_dictionary(page_id).map_err(|e| {
            CollateError::assembly_failed(format!("page object {page_id:?} is unreadable: {e}"))
        })?;

        let new_id = target.new_object_id();

        if self.id_map.contains_key(&page_id) {
            let mut private = HashMap::from([(page_id, new_id)]);
            PageCopier::new(source, &mut private).fill_page(target, page, page_id, new_id, parent);
        } else {
            self.id_map.insert(page_id, new_id);
            self.fill_page(target, page, page_id, new_id, parent);
        }

        Ok(new_id)
    }

    /// Write the copy of `page` into `target` under `new_id`.
    fn fill_page(
        &mut self,
        target: &mut Document,
        page: &Dictionary,
        page_id: ObjectId,
        new_id: ObjectId,
        parent: ObjectId,
    ) {
        let source = self.source;
        let mut copy = Dictionary::new();
        for (key, value) in page.iter() {
            if key.as_slice() == b"Parent" {
                continue;
            }
            copy.set(key.clone(), self.import(target, value));
        }

        for key in INHERITABLE_KEYS {
            if copy.has(key) {
                continue;
            }
            if let Some(value) = inherited_entry(source, page_id, key) {
                copy.set(key.to_vec(), self.import(target, value));
            }
        }

        copy.set("Parent", parent);
        target.objects.insert(new_id, Object::Dictionary(copy));
    }

    /// Rewrite `object` for the target, importing every object it references.
    fn import(&mut self, target: &mut Document, object: &Object) -> Object {
        match object {
            Object::Reference(id) => self.import_reference(target, *id),
            Object::Array(items) => {
                Object::Array(items.iter().map(|item| self.import(target, item)).collect())
            }
            Object::Dictionary(dict) => Object::Dictionary(self.import_dictionary(target, dict)),
            Object::Stream(stream) => {
                let mut stream = stream.clone();
                stream.dict = self.import_dictionary(target, &stream.dict);
                Object::Stream(stream)
            }
            other => other.clone(),
        }
    }

    fn import_dictionary(&mut self, target: &mut Document, dict: &Dictionary) -> Dictionary {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.import(target, value));
        }
        copy
    }

    fn import_reference(&mut self, target: &mut Document, id: ObjectId) -> Object {
        if let Some(new_id) = self.id_map.get(&id) {
            return Object::Reference(*new_id);
        }

        let source = self.source;
        let Ok(object) = source.get_object(id) else {
            // Dangling references read as null.
            return Object::Null;
        };

        // Other pages and page-tree nodes stay behind; links to them are
        // dropped rather than dragging the whole source tree along.
        if is_page_tree_node(object) {
            return Object::Null;
        }

        let new_id = target.new_object_id();
        self.id_map.insert(id, new_id);

        let copy = self.import(target, object);
        target.objects.insert(new_id, copy);

        Object::Reference(new_id)
    }
}

fn is_page_tree_node(object: &Object) -> bool {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        _ => return false,
    };

    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Page") | Ok(b"Pages")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::labeled_pdf_bytes;
    use lopdf::dictionary;

    /// One-page source whose page carries a text annotation pointing back at it.
    fn annotated_source() -> Document {
        let mut source = Document::load_mem(&labeled_pdf_bytes("a", 1)).unwrap();
        let page_id = source.get_pages()[&1];
        let annot_id = source.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Text",
            "Rect" => vec![0.into(), 0.into(), 20.into(), 20.into()],
            "Contents" => Object::string_literal("note"),
            "P" => page_id,
        });
        source
            .get_dictionary_mut(page_id)
            .unwrap()
            .set("Annots", vec![Object::Reference(annot_id)]);
        source
    }

    fn target_with_parent() -> (Document, ObjectId) {
        let mut target = Document::with_version("1.7");
        let parent = target.new_object_id();
        (target, parent)
    }

    #[test]
    fn test_copy_materialises_inherited_attributes() {
        let source = Document::load_mem(&labeled_pdf_bytes("a", 2)).unwrap();
        let pages = source.get_pages();
        let (mut target, parent) = target_with_parent();
        let mut id_map = HashMap::new();

        let new_id = PageCopier::new(&source, &mut id_map)
            .copy_page(&mut target, pages[&1], parent)
            .unwrap();

        let page = target.get_dictionary(new_id).unwrap();
        assert!(page.has(b"MediaBox"));
        assert!(page.has(b"Resources"));
        assert_eq!(page.get(b"Parent").unwrap().as_reference().unwrap(), parent);
    }

    #[test]
    fn test_copy_keeps_content() {
        let source = Document::load_mem(&labeled_pdf_bytes("a", 3)).unwrap();
        let pages = source.get_pages();
        let (mut target, parent) = target_with_parent();
        let mut id_map = HashMap::new();

        let new_id = PageCopier::new(&source, &mut id_map)
            .copy_page(&mut target, pages[&2], parent)
            .unwrap();

        assert_eq!(
            target.get_page_content(new_id).unwrap(),
            source.get_page_content(pages[&2]).unwrap()
        );
    }

    #[test]
    fn test_shared_objects_are_imported_once() {
        let source = Document::load_mem(&labeled_pdf_bytes("a", 2)).unwrap();
        let pages = source.get_pages();
        let (mut target, parent) = target_with_parent();
        let mut id_map = HashMap::new();

        let mut copier = PageCopier::new(&source, &mut id_map);
        let first = copier.copy_page(&mut target, pages[&1], parent).unwrap();
        let second = copier.copy_page(&mut target, pages[&2], parent).unwrap();

        let font = |page: ObjectId| {
            let resources = target.get_dictionary(page).unwrap().get(b"Resources").unwrap();
            let fonts = resources.as_dict().unwrap().get(b"Font").unwrap();
            fonts.as_dict().unwrap().get(b"F1").unwrap().as_reference().unwrap()
        };
        assert_eq!(font(first), font(second));
    }

    #[test]
    fn test_repeated_page_gets_its_own_annotations() {
        let source = annotated_source();
        let page_id = source.get_pages()[&1];
        let (mut target, parent) = target_with_parent();
        let mut id_map = HashMap::new();

        let mut copier = PageCopier::new(&source, &mut id_map);
        let first = copier.copy_page(&mut target, page_id, parent).unwrap();
        let second = copier.copy_page(&mut target, page_id, parent).unwrap();

        let annotation = |page: ObjectId| {
            let annots = target.get_dictionary(page).unwrap().get(b"Annots").unwrap();
            annots.as_array().unwrap()[0].as_reference().unwrap()
        };
        let owner = |annot: ObjectId| {
            let annot = target.get_dictionary(annot).unwrap();
            annot.get(b"P").unwrap().as_reference().unwrap()
        };

        assert_ne!(annotation(first), annotation(second));
        assert_eq!(owner(annotation(first)), first);
        assert_eq!(owner(annotation(second)), second);
    }

    #[test]
    fn test_copy_does_not_pull_in_source_tree() {
        let source = Document::load_mem(&labeled_pdf_bytes("a", 4)).unwrap();
        let pages = source.get_pages();
        let (mut target, parent) = target_with_parent();
        let mut id_map = HashMap::new();

        PageCopier::new(&source, &mut id_map)
            .copy_page(&mut target, pages[&1], parent)
            .unwrap();

        let copied_pages = target
            .objects
            .values()
            .filter(|object| is_page_tree_node(object))
            .count();
        assert_eq!(copied_pages, 1);
    }
}
