//! Error types for the pdftriage library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfTriageError`] — **Fatal**: processing this document cannot proceed
//!   at all (missing file, corrupt PDF, unreadable first page). Returned as
//!   `Err(PdfTriageError)` from the top-level `process_*` functions. The
//!   batch layer catches these per document and records them as `Failed`
//!   entries rather than aborting the run.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed (render glitch,
//!   extraction error) but all other pages are fine. Caught inside the owning
//!   pipeline, logged, and reflected in the report (an excluded image, an
//!   empty text entry) so callers can inspect partial success.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! document failure, log and continue, or collect everything for the batch
//! report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdftriage library.
///
/// Page-level failures use [`PageError`] and stay inside the pipeline that
/// owns the page rather than propagating here.
#[derive(Debug, Error)]
pub enum PdfTriageError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// The first page could not be read, so the document cannot be
    /// classified as raster or vector.
    #[error("Cannot classify '{path}': {detail}")]
    ClassificationFailed { path: PathBuf, detail: String },

    /// Page geometry was unreadable while rasterising for classification.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create an output directory or write an output file.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Raster pipeline: the page is excluded from the report's image list.
/// Vector pipeline: the page's text entry becomes the empty string.
/// The overall run continues either way.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed (unreadable geometry, canvas allocation).
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// Grayscale/threshold filtering or the image write failed.
    #[error("Page {page}: image processing failed: {detail}")]
    FilterFailed { page: usize, detail: String },

    /// Text extraction failed for this page.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-based page number the error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. }
            | PageError::FilterFailed { page, .. }
            | PageError::ExtractFailed { page, .. } => *page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display_shows_path() {
        let e = PdfTriageError::NotAPdf {
            path: PathBuf::from("notes.pdf"),
            magic: *b"<htm",
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.pdf"), "got: {msg}");
    }

    #[test]
    fn classification_failed_display() {
        let e = PdfTriageError::ClassificationFailed {
            path: PathBuf::from("scan.pdf"),
            detail: "page 1 missing".into(),
        };
        assert!(e.to_string().contains("scan.pdf"));
        assert!(e.to_string().contains("page 1 missing"));
    }

    #[test]
    fn page_error_reports_page_number() {
        let e = PageError::FilterFailed {
            page: 7,
            detail: "threshold".into(),
        };
        assert_eq!(e.page(), 7);
        assert!(e.to_string().contains("Page 7"));
    }

    #[test]
    fn page_error_round_trips_through_json() {
        let e = PageError::ExtractFailed {
            page: 2,
            detail: "bad stream".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        let back: PageError = serde_json::from_str(&json).unwrap();
        assert_eq!(back.page(), 2);
    }
}
