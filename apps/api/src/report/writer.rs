//! Low-level PDF assembly on top of `lopdf`: drawn pages plus pages merged in
//! from other documents.

use std::collections::HashSet;
use std::panic::{self, UnwindSafe};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::metrics::Face;
use super::unicode_font::{self, GlyphSet};
use super::ReportError;

/// A4 in points.
pub const PAGE_WIDTH: f32 = 595.0;
pub const PAGE_HEIGHT: f32 = 842.0;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_PAGE_TREE_DEPTH: usize = 32;

fn pdf_err(e: lopdf::Error) -> ReportError {
    ReportError::Pdf(e.to_string())
}

pub struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    /// Written at `finish`, once every glyph drawn with it is known.
    unicode_font_id: ObjectId,
    kids: Vec<ObjectId>,
    glyphs: GlyphSet,
}

impl PdfBuilder {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for face in [Face::Regular, Face::Bold] {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => face.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(face.resource_name(), font_id);
        }
        let unicode_font_id = doc.new_object_id();
        fonts.set(unicode_font::RESOURCE_NAME, unicode_font_id);
        let resources_id = doc.add_object(dictionary! { "Font" => fonts });

        Self {
            doc,
            pages_id,
            resources_id,
            unicode_font_id,
            kids: Vec::new(),
            glyphs: GlyphSet::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Appends one A4 page drawn from `operations`.
    pub fn add_page(&mut self, operations: Vec<Operation>) -> Result<(), ReportError> {
        let page_id = self.page_object(operations)?;
        self.kids.push(page_id);
        Ok(())
    }

    /// Inserts drawn pages so the first lands at position `index`.
    pub fn insert_pages(
        &mut self,
        index: usize,
        pages: Vec<Vec<Operation>>,
    ) -> Result<(), ReportError> {
        let index = index.min(self.kids.len());
        for (offset, operations) in pages.into_iter().enumerate() {
            let page_id = self.page_object(operations)?;
            self.kids.insert(index + offset, page_id);
        }
        Ok(())
    }

    /// Registers glyphs drawn with the embedded face on pages added so far.
    pub fn record_glyphs(&mut self, glyphs: GlyphSet) {
        for (id, source) in glyphs {
            self.glyphs.entry(id).or_insert(source);
        }
    }

    fn page_object(&mut self, operations: Vec<Operation>) -> Result<ObjectId, ReportError> {
        let content = Content { operations }.encode().map_err(pdf_err)?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));
        Ok(self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
            "Resources" => self.resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }))
    }

    /// Moves every page of `source` to the end of this document.
    ///
    /// Objects are renumbered past this document's ids, inherited page
    /// attributes are copied onto each page, and the source's own catalog and
    /// page-tree nodes are dropped. Returns the number of pages appended.
    /// On error nothing has been added.
    pub fn append_document(&mut self, mut source: Document) -> Result<usize, ReportError> {
        source.renumber_objects_with(self.doc.max_id + 1);
        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(ReportError::Pdf("document has no pages".to_string()));
        }

        let mut pages = Vec::with_capacity(page_ids.len());
        for page_id in &page_ids {
            let mut page = source.get_dictionary(*page_id).map_err(pdf_err)?.clone();
            for key in INHERITABLE_KEYS {
                if page.has(key) {
                    continue;
                }
                if let Some(value) = inherited_attribute(&source, &page, key) {
                    page.set(key.to_vec(), value);
                }
            }
            page.set("Parent", self.pages_id);
            pages.push((*page_id, page));
        }

        let structural: HashSet<ObjectId> = source
            .objects
            .iter()
            .filter(|(_, object)| is_structural(object))
            .map(|(id, _)| *id)
            .collect();

        for (id, object) in source.objects {
            if !structural.contains(&id) {
                self.doc.objects.insert(id, object);
            }
        }
        for (id, page) in pages {
            self.doc.objects.insert(id, Object::Dictionary(page));
            self.kids.push(id);
        }

        self.doc.max_id = self
            .doc
            .objects
            .keys()
            .map(|(number, _)| *number)
            .max()
            .unwrap_or(self.doc.max_id)
            .max(self.doc.max_id);
        Ok(page_ids.len())
    }

    /// Writes the fonts, page tree and catalog and serialises the document.
    pub fn finish(mut self) -> Result<Vec<u8>, ReportError> {
        match unicode_font::font() {
            Some(font) if !self.glyphs.is_empty() => {
                font.embed(&mut self.doc, self.unicode_font_id, &self.glyphs);
            }
            // Nothing drew with it; keep the resource entry valid without embedding
            _ => {
                self.doc.objects.insert(
                    self.unicode_font_id,
                    Object::Dictionary(dictionary! {
                        "Type" => "Font",
                        "Subtype" => "Type1",
                        "BaseFont" => "Helvetica",
                        "Encoding" => "WinAnsiEncoding",
                    }),
                );
            }
        }

        let count = self.kids.len() as i64;
        let kids: Vec<Object> = self.kids.into_iter().map(Object::Reference).collect();
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut out = Vec::new();
        self.doc
            .save_to(&mut out)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        Ok(out)
    }
}

/// Parses a PDF so it can be appended later. Fails on unreadable or page-less
/// input, including input that makes the parser panic.
pub fn load_document(bytes: &[u8]) -> Result<Document, ReportError> {
    let doc = contain_panic(|| Document::load_mem(bytes))?;
    if doc.get_pages().is_empty() {
        return Err(ReportError::Pdf("document has no pages".to_string()));
    }
    Ok(doc)
}

fn contain_panic<T, F>(parse: F) -> Result<T, ReportError>
where
    F: FnOnce() -> Result<T, lopdf::Error> + UnwindSafe,
{
    match panic::catch_unwind(parse) {
        Ok(result) => result.map_err(pdf_err),
        Err(_) => Err(ReportError::Pdf("PDF parser panicked".to_string())),
    }
}

fn inherited_attribute(source: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        if depth >= MAX_PAGE_TREE_DEPTH {
            break;
        }
        let node = source.get_dictionary(id).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    None
}

fn is_structural(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(name) if name == b"Catalog" || name == b"Pages"
    )
}
