//! Report types produced by the pipelines and the batch coordinator.
//!
//! Everything here is plain serde data. The pipeline reports
//! ([`RasterReport`], [`VectorReport`]) keep each pipeline's native shape;
//! the batch layer flattens both into the normalized [`DocumentSummary`]
//! schema so a single `processing_results.json` can describe a mixed batch.

use crate::classify::DocumentKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Document metadata as exposed by the PDF's Info dictionary.
///
/// Keys are the raw Info names (`Title`, `Author`, `Producer`, …). Absent or
/// unreadable Info yields an empty map.
pub type DocumentMetadata = BTreeMap<String, String>;

// ── Pipeline reports ─────────────────────────────────────────────────────

/// One successfully binarized page from a raster run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterPageOutput {
    /// 1-indexed page number.
    pub page_number: usize,
    /// Path of the written `page_<n>_processed.png`.
    pub file_path: PathBuf,
}

/// Result of a raster (scanned-document) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasterReport {
    /// Pages in the document.
    pub total_pages: usize,
    /// Pages the run attempted — `min(total_pages, max_pages)`. Failed pages
    /// are excluded from `processed_images` but still counted here.
    pub pages_processed: usize,
    /// Successful pages, sorted by page number.
    pub processed_images: Vec<RasterPageOutput>,
}

/// Result of a vector (text-based) run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorReport {
    /// Pages in the document.
    pub total_pages: usize,
    /// Always equals `total_pages` — the vector pipeline has no page cap.
    pub pages_processed: usize,
    /// One entry per page, in page order. Failed or empty pages hold "".
    pub text_content: Vec<String>,
    /// Info-dictionary metadata, verbatim.
    pub metadata: DocumentMetadata,
    /// Pages whose trimmed text is non-empty.
    pub pages_with_text: usize,
    /// Sum of text lengths over pages counted in `pages_with_text`.
    pub total_text_length: usize,
}

/// The per-document result, tagged by classified type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DocumentReport {
    Raster(RasterReport),
    Vector(VectorReport),
}

impl DocumentReport {
    pub fn total_pages(&self) -> usize {
        match self {
            DocumentReport::Raster(r) => r.total_pages,
            DocumentReport::Vector(r) => r.total_pages,
        }
    }

    pub fn pages_processed(&self) -> usize {
        match self {
            DocumentReport::Raster(r) => r.pages_processed,
            DocumentReport::Vector(r) => r.pages_processed,
        }
    }
}

/// Shallow profile of a document: classification plus metadata, no outputs.
///
/// Produced by [`crate::process::inspect`] for `--classify-only` style use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentProfile {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub page_count: usize,
    pub metadata: DocumentMetadata,
}

// ── Normalized batch schema ──────────────────────────────────────────────

/// Kind of artifact a processed page produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Text,
}

/// One row of a normalized per-document result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFile {
    /// 1-indexed page number.
    pub page_number: usize,
    pub file_path: PathBuf,
    pub file_type: FileKind,
    /// Extracted character count; present for text rows only and may be 0
    /// for pages with no text (whose file was never written).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
}

/// A successfully processed document, in the common schema shared by raster
/// and vector results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub total_pages: usize,
    pub pdf_name: String,
    pub pdf_path: PathBuf,
    pub processed_files: Vec<ProcessedFile>,
    /// Present for vector documents only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DocumentMetadata>,
}

/// One entry in the batch result list: a normalized report or a recorded
/// failure. Serialized untagged so the JSON matches the report schema —
/// failures are recognizable by the presence of an `error` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentEntry {
    Processed(DocumentSummary),
    Failed {
        pdf_name: String,
        pdf_path: PathBuf,
        error: String,
    },
}

impl DocumentEntry {
    pub fn is_failure(&self) -> bool {
        matches!(self, DocumentEntry::Failed { .. })
    }

    pub fn pdf_name(&self) -> &str {
        match self {
            DocumentEntry::Processed(s) => &s.pdf_name,
            DocumentEntry::Failed { pdf_name, .. } => pdf_name,
        }
    }
}

/// The aggregate result of a batch run, persisted as
/// `processing_results.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_pdfs: usize,
    pub successful_processing: usize,
    pub failed_processing: usize,
    pub results: Vec<DocumentEntry>,
}

/// Outcome of [`crate::batch::process_directory`].
///
/// "No PDFs found" and "input directory missing" are result values, not
/// errors — the caller gets an object with a single `error` field, exactly
/// as it lands in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Summary(BatchSummary),
    Error { error: String },
}

impl BatchOutcome {
    pub fn as_summary(&self) -> Option<&BatchSummary> {
        match self {
            BatchOutcome::Summary(s) => Some(s),
            BatchOutcome::Error { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            BatchOutcome::Summary(_) => None,
            BatchOutcome::Error { error } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_summary() -> DocumentSummary {
        DocumentSummary {
            kind: DocumentKind::Vector,
            total_pages: 2,
            pdf_name: "report".into(),
            pdf_path: PathBuf::from("/in/report.pdf"),
            processed_files: vec![
                ProcessedFile {
                    page_number: 1,
                    file_path: PathBuf::from("/out/report/page_1_text.txt"),
                    file_type: FileKind::Text,
                    content_length: Some(120),
                },
                ProcessedFile {
                    page_number: 2,
                    file_path: PathBuf::from("/out/report/page_2_text.txt"),
                    file_type: FileKind::Text,
                    content_length: Some(0),
                },
            ],
            metadata: Some(DocumentMetadata::new()),
        }
    }

    #[test]
    fn document_report_is_tagged_by_type() {
        let report = DocumentReport::Raster(RasterReport {
            total_pages: 3,
            pages_processed: 2,
            processed_images: vec![],
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["type"], "raster");
        assert_eq!(json["pages_processed"], 2);
    }

    #[test]
    fn file_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_value(FileKind::Image).unwrap(), "image");
        assert_eq!(serde_json::to_value(FileKind::Text).unwrap(), "text");
    }

    #[test]
    fn failed_entry_carries_error_field() {
        let entry = DocumentEntry::Failed {
            pdf_name: "broken.pdf".into(),
            pdf_path: PathBuf::from("/in/broken.pdf"),
            error: "corrupt xref".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["error"], "corrupt xref");
        assert!(json.get("type").is_none());
    }

    #[test]
    fn entry_round_trip_preserves_variant() {
        let entries = vec![
            DocumentEntry::Processed(sample_summary()),
            DocumentEntry::Failed {
                pdf_name: "broken.pdf".into(),
                pdf_path: PathBuf::from("/in/broken.pdf"),
                error: "corrupt".into(),
            },
        ];
        let json = serde_json::to_string(&entries).unwrap();
        let back: Vec<DocumentEntry> = serde_json::from_str(&json).unwrap();
        assert!(!back[0].is_failure());
        assert!(back[1].is_failure());
        assert_eq!(back[1].pdf_name(), "broken.pdf");
    }

    #[test]
    fn batch_outcome_error_shape() {
        let outcome = BatchOutcome::Error {
            error: "No PDF files found in the input directory".into(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["error"], "No PDF files found in the input directory");
        assert!(json.get("results").is_none());
    }

    #[test]
    fn empty_content_length_is_omitted_for_image_rows() {
        let row = ProcessedFile {
            page_number: 1,
            file_path: PathBuf::from("/out/page_1_processed.png"),
            file_type: FileKind::Image,
            content_length: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("content_length").is_none());
    }
}
