//! Raster/vector document classification.
//!
//! The heuristic, in precedence order:
//!
//! 1. Extractable text on page 1 → **Vector**. Text presence is decisive,
//!    even when the page also carries images.
//! 2. No text: render page 1 and measure Canny edge density. Above
//!    [`RASTER_EDGE_DENSITY`] → **Raster**.
//! 3. Everything else (including entirely blank pages) → **Vector**.
//!
//! Known failure modes, kept on purpose for compatibility: image-heavy PDFs
//! with a text layer classify as Vector at step 1 regardless of edge density,
//! and blank first pages classify as Vector by falling through step 2.

use crate::error::PdfTriageError;
use crate::pdf::PdfDocument;
use crate::pipeline::{filters, render};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Edge-density cut-off above which a text-less document counts as raster.
pub const RASTER_EDGE_DENSITY: f64 = 0.95;

/// The classified document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Scanned/image-based: pages are processed as bitmaps.
    Raster,
    /// Text-based: pages are processed by text extraction.
    Vector,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Raster => f.write_str("raster"),
            DocumentKind::Vector => f.write_str("vector"),
        }
    }
}

/// Classify an opened document by its first page.
///
/// Fails with [`PdfTriageError::ClassificationFailed`] when the document has
/// no pages or page 1 cannot be read.
pub fn classify(pdf: &PdfDocument) -> Result<DocumentKind, PdfTriageError> {
    if pdf.page_count() == 0 {
        return Err(PdfTriageError::ClassificationFailed {
            path: pdf.path().to_path_buf(),
            detail: "document has no pages".into(),
        });
    }

    let first_page = pdf.page_numbers().next().unwrap_or(1);

    let text = pdf
        .extract_page_text(first_page)
        .map_err(|e| PdfTriageError::ClassificationFailed {
            path: pdf.path().to_path_buf(),
            detail: format!("text extraction on page {first_page}: {e}"),
        })?;

    if !text.trim().is_empty() {
        debug!(
            "{}: page {} has {} chars of text → vector",
            pdf.path().display(),
            first_page,
            text.len()
        );
        return Ok(DocumentKind::Vector);
    }

    let canvas = render::rasterize_page(pdf, first_page).map_err(|e| {
        PdfTriageError::ClassificationFailed {
            path: pdf.path().to_path_buf(),
            detail: e.to_string(),
        }
    })?;

    let density = filters::edge_density(&filters::to_grayscale(&canvas));
    debug!(
        "{}: no text on page {}, edge density {:.4} → {}",
        pdf.path().display(),
        first_page,
        density,
        decide(false, density)
    );

    Ok(decide(false, density))
}

/// The pure classification decision, separated from I/O so the precedence
/// and threshold semantics are directly testable.
pub fn decide(has_text: bool, edge_density: f64) -> DocumentKind {
    if has_text {
        return DocumentKind::Vector;
    }
    if edge_density > RASTER_EDGE_DENSITY {
        DocumentKind::Raster
    } else {
        DocumentKind::Vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_wins_regardless_of_density() {
        assert_eq!(decide(true, 0.0), DocumentKind::Vector);
        assert_eq!(decide(true, 1.0), DocumentKind::Vector);
    }

    #[test]
    fn density_above_threshold_is_raster() {
        assert_eq!(decide(false, 0.951), DocumentKind::Raster);
        assert_eq!(decide(false, 1.0), DocumentKind::Raster);
    }

    #[test]
    fn density_at_or_below_threshold_is_vector() {
        // The comparison is strict: exactly 0.95 stays vector.
        assert_eq!(decide(false, RASTER_EDGE_DENSITY), DocumentKind::Vector);
        assert_eq!(decide(false, 0.3), DocumentKind::Vector);
        assert_eq!(decide(false, 0.0), DocumentKind::Vector);
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(DocumentKind::Raster).unwrap(),
            "raster"
        );
        assert_eq!(
            serde_json::to_value(DocumentKind::Vector).unwrap(),
            "vector"
        );
        assert_eq!(DocumentKind::Vector.to_string(), "vector");
    }
}
