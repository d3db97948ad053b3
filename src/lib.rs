//! # pdftriage
//!
//! Classify PDF documents as **raster** (scanned/image-based) or **vector**
//! (text-based), then run a type-specific extraction pipeline: adaptive
//! binarization of page images for raster documents, per-page text extraction
//! for vector documents. Batch a directory of files with bounded concurrency
//! and aggregate everything into one normalized JSON report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input directory
//!  │
//!  ├─ 1. Scan      list *.pdf files (case-insensitive)
//!  ├─ 2. Classify  page-1 text? → vector · else edge density > 0.95 → raster
//!  ├─ 3. Process   per-page jobs on a bounded worker pool
//!  │      raster:  render → grayscale → adaptive threshold → page_<n>_processed.png
//!  │      vector:  extract text → page_<n>_text.txt + ordered text list
//!  └─ 4. Report    normalized per-document results → processing_results.json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdftriage::{process_directory, ProcessingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProcessingConfig::default();
//!     let outcome = process_directory("pdfs", "output", &config).await?;
//!     if let Some(summary) = outcome.as_summary() {
//!         println!(
//!             "{}/{} documents processed",
//!             summary.successful_processing, summary.total_pdfs
//!         );
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Classification caveats
//!
//! The classifier is a deliberate heuristic: extractable text on the first
//! page decides "vector" even for image-heavy documents, and a blank first
//! page decides "vector" by falling through the edge-density test. Page
//! rasterisation composites embedded images onto a blank canvas — it is an
//! approximation, not a renderer; see [`pipeline::render`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftriage` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdftriage = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod output;
pub mod pdf;
pub mod pipeline;
pub mod process;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{process_directory, process_directory_sync, NO_PDFS_FOUND, RESULTS_FILE_NAME};
pub use classify::{classify, DocumentKind, RASTER_EDGE_DENSITY};
pub use config::{ProcessingConfig, ProcessingConfigBuilder};
pub use error::{PageError, PdfTriageError};
pub use output::{
    BatchOutcome, BatchSummary, DocumentEntry, DocumentMetadata, DocumentProfile, DocumentReport,
    DocumentSummary, FileKind, ProcessedFile, RasterPageOutput, RasterReport, VectorReport,
};
pub use pdf::PdfDocument;
pub use process::{inspect, process_document, process_document_sync};
pub use progress::{NoopProgressCallback, ProcessingProgressCallback, ProgressCallback};
