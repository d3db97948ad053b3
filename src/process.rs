//! Per-document orchestration: classify, then dispatch to a pipeline.
//!
//! This is the primary library entry point for a single document. It owns no
//! policy of its own — classification decides the pipeline, the pipeline
//! decides what the pages become — and it propagates every fatal error to
//! the caller. Catching per-document failures is the batch layer's job.

use crate::classify::{self, DocumentKind};
use crate::config::ProcessingConfig;
use crate::error::PdfTriageError;
use crate::output::{DocumentProfile, DocumentReport};
use crate::pdf::PdfDocument;
use crate::pipeline::{raster, vector};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Process one PDF into per-page artifacts under `output_dir`.
///
/// Creates `output_dir` if absent, classifies the document by its first
/// page, then runs the matching pipeline.
///
/// # Errors
/// Returns `Err(PdfTriageError)` when the document cannot be opened or
/// classified, or the output directory cannot be created. Page-level
/// failures inside a pipeline do not surface here — they are reflected in
/// the returned report.
pub async fn process_document(
    path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<(DocumentKind, DocumentReport), PdfTriageError> {
    let path = path.as_ref().to_path_buf();
    let output_dir = output_dir.as_ref().to_path_buf();
    let start = Instant::now();
    info!("Processing {}", path.display());

    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| PdfTriageError::OutputWriteFailed {
            path: output_dir.clone(),
            source: e,
        })?;

    let pdf = open_document(path).await?;
    let kind = classify_document(Arc::clone(&pdf)).await?;
    info!("{}: classified as {}", pdf.path().display(), kind);

    let report = match kind {
        DocumentKind::Raster => {
            DocumentReport::Raster(raster::process(Arc::clone(&pdf), &output_dir, config).await?)
        }
        DocumentKind::Vector => {
            DocumentReport::Vector(vector::process(Arc::clone(&pdf), &output_dir, config).await?)
        }
    };

    info!(
        "{}: {} run finished ({}/{} pages, {}ms)",
        pdf.path().display(),
        kind,
        report.pages_processed(),
        report.total_pages(),
        start.elapsed().as_millis()
    );

    Ok((kind, report))
}

/// Synchronous wrapper around [`process_document`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_document_sync(
    path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<(DocumentKind, DocumentReport), PdfTriageError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfTriageError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(process_document(path, output_dir, config))
}

/// Classify a document and read its metadata without producing outputs.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DocumentProfile, PdfTriageError> {
    let pdf = open_document(path.as_ref().to_path_buf()).await?;
    let kind = classify_document(Arc::clone(&pdf)).await?;
    Ok(DocumentProfile {
        kind,
        page_count: pdf.page_count(),
        metadata: pdf.metadata(),
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Open and parse on a blocking worker: parsing a large PDF is file I/O plus
/// CPU work the async executor should not absorb.
async fn open_document(path: std::path::PathBuf) -> Result<Arc<PdfDocument>, PdfTriageError> {
    let pdf = tokio::task::spawn_blocking(move || PdfDocument::open(&path))
        .await
        .map_err(|e| PdfTriageError::Internal(format!("open task panicked: {e}")))??;
    Ok(Arc::new(pdf))
}

/// Classification renders and edge-detects the first page — also CPU-bound.
async fn classify_document(pdf: Arc<PdfDocument>) -> Result<DocumentKind, PdfTriageError> {
    tokio::task::spawn_blocking(move || classify::classify(&pdf))
        .await
        .map_err(|e| PdfTriageError::Internal(format!("classify task panicked: {e}")))?
}
