//! PDF structural reading on top of `lopdf`.
//!
//! This is the only module that touches the PDF object model. It exposes just
//! what the pipelines consume: page count, page media boxes, per-page text,
//! embedded raster image streams, and the Info-dictionary metadata. No
//! content-stream interpretation happens here beyond what `lopdf` provides.
//!
//! A [`PdfDocument`] is immutable once opened and is `Send + Sync`, so a
//! single parse is shared across blocking worker tasks via `Arc` — each page
//! job reads from the same object tree, nothing is re-opened per page.

use crate::error::PdfTriageError;
use crate::output::DocumentMetadata;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// US-Letter media box, used when a page declares none.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Filters whose stream content is already a self-contained image codec
/// payload (JPEG / JPEG2000) rather than raw pixel data.
const IMAGE_CODEC_FILTERS: [&[u8]; 2] = [b"DCTDecode", b"JPXDecode"];

/// An opened PDF document plus its page table.
#[derive(Debug)]
pub struct PdfDocument {
    path: PathBuf,
    doc: Document,
    /// 1-based page number → page object id, in document order.
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    /// Open and parse a PDF, validating existence, readability, and the
    /// `%PDF` magic bytes before handing the file to the parser.
    pub fn open(path: &Path) -> Result<Self, PdfTriageError> {
        if !path.exists() {
            return Err(PdfTriageError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        match std::fs::File::open(path) {
            Ok(mut f) => {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(PdfTriageError::NotAPdf {
                        path: path.to_path_buf(),
                        magic,
                    });
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(PdfTriageError::PermissionDenied {
                    path: path.to_path_buf(),
                });
            }
            Err(_) => {
                return Err(PdfTriageError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
        }

        let doc = Document::load(path).map_err(|e| PdfTriageError::CorruptPdf {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

        let pages = doc.get_pages();
        debug!("Opened {} ({} pages)", path.display(), pages.len());

        Ok(Self {
            path: path.to_path_buf(),
            doc,
            pages,
        })
    }

    /// Path the document was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of pages in the page tree.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// 1-based page numbers, in document order.
    pub fn page_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }

    /// Extract the text of one page (1-based).
    ///
    /// A page without text content yields `Ok("")`; an unknown page number or
    /// an unparseable content stream yields `Err`.
    pub fn extract_page_text(&self, page_number: u32) -> Result<String, lopdf::Error> {
        self.doc.extract_text(&[page_number])
    }

    /// Media-box size of a page (1-based) in PDF units: `(width, height)`.
    ///
    /// The box is looked up on the page dictionary and, failing that, up the
    /// `Parent` chain (media boxes are inheritable). Pages with no resolvable
    /// box fall back to US Letter.
    pub fn media_box(&self, page_number: u32) -> (f32, f32) {
        let rect = self
            .pages
            .get(&page_number)
            .and_then(|&id| self.inherited_entry(id, b"MediaBox"))
            .and_then(|obj| self.rect_values(obj))
            .unwrap_or(DEFAULT_MEDIA_BOX);

        ((rect[2] - rect[0]).abs(), (rect[3] - rect[1]).abs())
    }

    /// Raw content bytes of every image XObject referenced by a page's
    /// resources, in dictionary encounter order.
    ///
    /// Streams behind image codec filters (DCTDecode, JPXDecode) are returned
    /// verbatim — their payload is a decodable JPEG/JP2 file. Anything else is
    /// decompressed first so generic codec sniffing gets a fair chance.
    /// Unreadable streams are skipped.
    pub fn embedded_images(&self, page_number: u32) -> Vec<Vec<u8>> {
        let Some(&page_id) = self.pages.get(&page_number) else {
            return Vec::new();
        };

        let Some(xobjects) = self
            .inherited_entry(page_id, b"Resources")
            .and_then(|res| self.as_dict(res))
            .and_then(|res| res.get(b"XObject").ok())
            .and_then(|x| self.as_dict(x))
        else {
            return Vec::new();
        };

        let mut images = Vec::new();
        for (name, entry) in xobjects.iter() {
            let Object::Stream(stream) = self.resolve(entry) else {
                continue;
            };
            let is_image = matches!(
                stream.dict.get(b"Subtype").map(|s| self.resolve(s)),
                Ok(Object::Name(n)) if n == b"Image"
            );
            if !is_image {
                continue;
            }

            let bytes = if self.has_image_codec_filter(&stream.dict) {
                stream.content.clone()
            } else {
                stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone())
            };
            debug!(
                "Page {}: image XObject /{} ({} bytes)",
                page_number,
                String::from_utf8_lossy(name),
                bytes.len()
            );
            images.push(bytes);
        }
        images
    }

    /// Info-dictionary metadata. Absent or unreadable Info yields an empty
    /// map; individual non-string values are skipped.
    pub fn metadata(&self) -> DocumentMetadata {
        let mut meta = DocumentMetadata::new();

        let Some(info) = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .map(|o| self.resolve(o))
            .and_then(|o| self.as_dict(o))
        else {
            return meta;
        };

        for (key, value) in info.iter() {
            if let Object::String(bytes, _) = self.resolve(value) {
                meta.insert(
                    String::from_utf8_lossy(key).into_owned(),
                    decode_text_string(bytes),
                );
            }
        }
        meta
    }

    // ── Object-model helpers ─────────────────────────────────────────────

    /// Follow reference chains to the referenced object (bounded, so a
    /// malformed circular reference cannot loop forever).
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> &'a Object {
        for _ in 0..16 {
            match obj {
                Object::Reference(id) => match self.doc.get_object(*id) {
                    Ok(target) => obj = target,
                    Err(_) => return obj,
                },
                _ => return obj,
            }
        }
        obj
    }

    fn as_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Look up `key` on a page dictionary, walking the `Parent` chain for
    /// inheritable entries.
    fn inherited_entry(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        for _ in 0..32 {
            if let Ok(found) = dict.get(key) {
                return Some(found);
            }
            let parent = dict.get(b"Parent").ok()?;
            dict = self.as_dict(parent)?;
        }
        None
    }

    fn rect_values(&self, obj: &Object) -> Option<[f32; 4]> {
        let Object::Array(items) = self.resolve(obj) else {
            return None;
        };
        if items.len() != 4 {
            return None;
        }
        let mut rect = [0f32; 4];
        for (slot, item) in rect.iter_mut().zip(items) {
            *slot = match self.resolve(item) {
                Object::Integer(i) => *i as f32,
                Object::Real(f) => *f,
                _ => return None,
            };
        }
        Some(rect)
    }

    fn has_image_codec_filter(&self, dict: &Dictionary) -> bool {
        let Ok(filter) = dict.get(b"Filter") else {
            return false;
        };
        match self.resolve(filter) {
            Object::Name(n) => IMAGE_CODEC_FILTERS.contains(&n.as_slice()),
            Object::Array(filters) => filters.iter().any(|f| {
                matches!(self.resolve(f), Object::Name(n) if IMAGE_CODEC_FILTERS.contains(&n.as_slice()))
            }),
            _ => false,
        }
    }
}

/// Decode a PDF text string: UTF-16BE when BOM-prefixed, bytes otherwise.
fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn save_minimal_pdf(dir: &Path, name: &str, media_box: Option<Vec<Object>>) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        if let Some(rect) = media_box {
            page_dict.set("MediaBox", Object::Array(rect));
        }
        let page_id = doc.add_object(page_dict);

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal("Fixture"),
            "Producer" => Object::string_literal("pdftriage tests"),
        });
        doc.trailer.set("Info", info_id);

        let path = dir.join(name);
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn open_rejects_missing_file() {
        let err = PdfDocument::open(Path::new("/definitely/not/here.pdf")).unwrap_err();
        assert!(matches!(err, PdfTriageError::FileNotFound { .. }));
    }

    #[test]
    fn open_rejects_non_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"<html>not a pdf</html>").unwrap();

        let err = PdfDocument::open(&path).unwrap_err();
        assert!(matches!(err, PdfTriageError::NotAPdf { .. }));
    }

    #[test]
    fn media_box_reads_declared_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_minimal_pdf(
            dir.path(),
            "sized.pdf",
            Some(vec![0.into(), 0.into(), 200.into(), 100.into()]),
        );

        let pdf = PdfDocument::open(&path).unwrap();
        assert_eq!(pdf.page_count(), 1);
        assert_eq!(pdf.media_box(1), (200.0, 100.0));
    }

    #[test]
    fn media_box_defaults_to_letter() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_minimal_pdf(dir.path(), "boxless.pdf", None);

        let pdf = PdfDocument::open(&path).unwrap();
        assert_eq!(pdf.media_box(1), (612.0, 792.0));
    }

    #[test]
    fn metadata_reads_info_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_minimal_pdf(dir.path(), "meta.pdf", None);

        let pdf = PdfDocument::open(&path).unwrap();
        let meta = pdf.metadata();
        assert_eq!(meta.get("Title").map(String::as_str), Some("Fixture"));
        assert_eq!(
            meta.get("Producer").map(String::as_str),
            Some("pdftriage tests")
        );
    }

    #[test]
    fn pages_without_images_yield_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_minimal_pdf(dir.path(), "plain.pdf", None);

        let pdf = PdfDocument::open(&path).unwrap();
        assert!(pdf.embedded_images(1).is_empty());
        assert!(pdf.embedded_images(99).is_empty());
    }

    #[test]
    fn utf16_text_strings_are_decoded() {
        let bytes = [0xFE, 0xFF, 0x00, b'H', 0x00, b'i'];
        assert_eq!(decode_text_string(&bytes), "Hi");
        assert_eq!(decode_text_string(b"plain"), "plain");
    }
}
