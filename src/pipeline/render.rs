//! Page rasterisation: approximate a page as a bitmap.
//!
//! ## What "render" means here
//!
//! This is NOT full PDF rendering. A white canvas is allocated at the page's
//! media-box size and every embedded raster image found in the page's
//! resources is pasted at the origin, in encounter order. Vector drawing
//! operators, fonts, and line art are ignored entirely. For the scanned
//! documents this crate targets — pages that are one full-bleed bitmap —
//! the approximation is equivalent to the real thing; for anything else it
//! yields a mostly-blank canvas, which the classifier's edge-density test
//! treats as vector. Callers expecting visual fidelity should not use this.
//!
//! ## Why no async here
//!
//! Rasterisation is pure CPU work over an already-parsed document. The
//! pipelines call it inside `tokio::task::spawn_blocking`, keeping the async
//! workers free; this module stays synchronous and independently testable.

use crate::error::PageError;
use crate::pdf::PdfDocument;
use image::{imageops, Rgb, RgbImage};
use tracing::debug;

/// Render a page (1-based) to an RGB bitmap.
///
/// Fails only when the canvas itself cannot be produced (page missing from
/// the page tree). Undecodable embedded images are skipped silently — a
/// scanned page with a broken image degrades to a blank canvas rather than
/// an error.
pub fn rasterize_page(pdf: &PdfDocument, page_number: u32) -> Result<RgbImage, PageError> {
    if !pdf.page_numbers().any(|n| n == page_number) {
        return Err(PageError::RenderFailed {
            page: page_number as usize,
            detail: format!("page {page_number} not present in page tree"),
        });
    }

    let (width_pt, height_pt) = pdf.media_box(page_number);
    let width = (width_pt.round() as u32).max(1);
    let height = (height_pt.round() as u32).max(1);

    let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));

    for (i, bytes) in pdf.embedded_images(page_number).iter().enumerate() {
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                imageops::overlay(&mut canvas, &decoded.to_rgb8(), 0, 0);
            }
            Err(e) => {
                debug!(
                    "Page {page_number}: skipping undecodable embedded image #{i}: {e}"
                );
            }
        }
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Document, Object, Stream};
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    /// One-page PDF with the given media box and, optionally, an embedded
    /// JPEG image XObject.
    fn save_pdf_with_image(dir: &Path, media: [i64; 4], with_image: bool) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut page_dict = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media.iter().map(|&v| v.into()).collect::<Vec<Object>>(),
        };

        if with_image {
            // A 4x4 black JPEG as the embedded scan.
            let mut jpeg = Vec::new();
            image::DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([0, 0, 0])))
                .write_to(&mut Cursor::new(&mut jpeg), image::ImageFormat::Jpeg)
                .unwrap();

            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 4,
                    "Height" => 4,
                    "ColorSpace" => "DeviceRGB",
                    "BitsPerComponent" => 8,
                    "Filter" => "DCTDecode",
                },
                jpeg,
            ));
            page_dict.set(
                "Resources",
                dictionary! {
                    "XObject" => dictionary! { "Im0" => image_id },
                },
            );
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

        let path = dir.join(if with_image { "scan.pdf" } else { "blank.pdf" });
        doc.save(&path).unwrap();
        path
    }

    #[test]
    fn blank_page_renders_white_at_media_box_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_pdf_with_image(dir.path(), [0, 0, 120, 80], false);
        let pdf = PdfDocument::open(&path).unwrap();

        let canvas = rasterize_page(&pdf, 1).unwrap();
        assert_eq!(canvas.dimensions(), (120, 80));
        assert!(canvas.pixels().all(|p| *p == Rgb([255, 255, 255])));
    }

    #[test]
    fn embedded_image_is_pasted_at_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_pdf_with_image(dir.path(), [0, 0, 32, 32], true);
        let pdf = PdfDocument::open(&path).unwrap();

        let canvas = rasterize_page(&pdf, 1).unwrap();
        assert_eq!(canvas.dimensions(), (32, 32));
        // The 4x4 scan lands at (0,0); JPEG is lossy so just check it is dark.
        assert!(canvas.get_pixel(1, 1)[0] < 64, "pasted region must be dark");
        // Outside the pasted region the canvas stays white.
        assert_eq!(*canvas.get_pixel(20, 20), Rgb([255, 255, 255]));
    }

    #[test]
    fn missing_page_is_a_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_pdf_with_image(dir.path(), [0, 0, 10, 10], false);
        let pdf = PdfDocument::open(&path).unwrap();

        let err = rasterize_page(&pdf, 5).unwrap_err();
        assert!(matches!(err, PageError::RenderFailed { page: 5, .. }));
    }
}
