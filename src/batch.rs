//! Batch processing: a directory of PDFs in, one normalized JSON report out.
//!
//! Documents are processed concurrently under the same worker bound the
//! pipelines use for pages. Each document is isolated: any failure — from
//! creating its output subdirectory to a corrupt page tree — becomes a
//! `Failed` entry in the results list and never aborts the batch.
//!
//! The two pipeline report shapes are flattened here into the common
//! [`DocumentSummary`] schema so `processing_results.json` can describe a
//! mixed raster/vector batch uniformly.

use crate::config::ProcessingConfig;
use crate::error::PdfTriageError;
use crate::output::{
    BatchOutcome, BatchSummary, DocumentEntry, DocumentSummary, FileKind, ProcessedFile,
    RasterReport, VectorReport,
};
use crate::process;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Result-level error for an input directory with no PDFs.
pub const NO_PDFS_FOUND: &str = "No PDF files found in the input directory";

/// File name of the aggregate report written under the output directory.
pub const RESULTS_FILE_NAME: &str = "processing_results.json";

/// Process every `*.pdf` (case-insensitive) in `input_dir`.
///
/// Per-document outputs land in `<output_dir>/<file stem>/`; the aggregate
/// summary is written to `<output_dir>/processing_results.json`.
///
/// A missing input directory or one without PDFs yields
/// [`BatchOutcome::Error`] — nothing is written in that case. `Err` is
/// reserved for failures to persist the summary itself.
pub async fn process_directory(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<BatchOutcome, PdfTriageError> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    if !input_dir.is_dir() {
        return Ok(BatchOutcome::Error {
            error: format!("Input directory not found: {}", input_dir.display()),
        });
    }

    let pdf_files = list_pdf_files(input_dir);
    if pdf_files.is_empty() {
        return Ok(BatchOutcome::Error {
            error: NO_PDFS_FOUND.to_string(),
        });
    }

    info!(
        "Batch: {} PDF(s) from {} → {}",
        pdf_files.len(),
        input_dir.display(),
        output_dir.display()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(pdf_files.len());
    }
    let start = Instant::now();

    let total_pdfs = pdf_files.len();
    let results: Vec<DocumentEntry> = stream::iter(
        pdf_files
            .into_iter()
            .map(|pdf_path| process_one(pdf_path, output_dir, config)),
    )
    .buffer_unordered(config.workers)
    .collect()
    .await;

    // Counts are derived from the collected entries, not tracked while the
    // fan-out runs.
    let successful = results.iter().filter(|r| !r.is_failure()).count();
    let failed = results.iter().filter(|r| r.is_failure()).count();

    let summary = BatchSummary {
        total_pdfs,
        successful_processing: successful,
        failed_processing: failed,
        results,
    };

    write_summary(output_dir, &summary).await?;
    info!(
        "Batch complete: {}/{} succeeded in {}ms",
        successful,
        total_pdfs,
        start.elapsed().as_millis()
    );

    Ok(BatchOutcome::Summary(summary))
}

/// Synchronous wrapper around [`process_directory`].
pub fn process_directory_sync(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ProcessingConfig,
) -> Result<BatchOutcome, PdfTriageError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| PdfTriageError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(process_directory(input_dir, output_dir, config))
}

/// Files in `dir` with a case-insensitive `.pdf` extension, sorted by path
/// so reports are deterministic across runs.
fn list_pdf_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .into_iter()
        .flatten()
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    files.sort();
    files
}

/// Process a single document into its own subdirectory, converting every
/// failure into a recorded entry.
async fn process_one(
    pdf_path: PathBuf,
    output_dir: &Path,
    config: &ProcessingConfig,
) -> DocumentEntry {
    let file_name = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| pdf_path.display().to_string());
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.clone());
    let doc_output_dir = output_dir.join(&stem);

    let entry = match process::process_document(&pdf_path, &doc_output_dir, config).await {
        Ok((_, report)) => {
            let summary = match report {
                crate::output::DocumentReport::Raster(r) => {
                    normalize_raster(r, &stem, &pdf_path)
                }
                crate::output::DocumentReport::Vector(r) => {
                    normalize_vector(r, &stem, &pdf_path, &doc_output_dir)
                }
            };
            DocumentEntry::Processed(summary)
        }
        Err(e) => {
            warn!("{}: {e}", pdf_path.display());
            DocumentEntry::Failed {
                pdf_name: file_name.clone(),
                pdf_path,
                error: e.to_string(),
            }
        }
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_document_complete(file_name, !entry.is_failure());
    }
    entry
}

/// Flatten a raster report into the common schema. Rows carry the true page
/// number, so a failed page leaves a gap instead of renumbering later pages.
fn normalize_raster(report: RasterReport, stem: &str, pdf_path: &Path) -> DocumentSummary {
    DocumentSummary {
        kind: crate::classify::DocumentKind::Raster,
        total_pages: report.total_pages,
        pdf_name: stem.to_string(),
        pdf_path: pdf_path.to_path_buf(),
        processed_files: report
            .processed_images
            .into_iter()
            .map(|img| ProcessedFile {
                page_number: img.page_number,
                file_path: img.file_path,
                file_type: FileKind::Image,
                content_length: None,
            })
            .collect(),
        metadata: None,
    }
}

/// Flatten a vector report into the common schema. Every page gets a row —
/// empty pages too, with `content_length: 0` and the path their text file
/// would have had.
fn normalize_vector(
    report: VectorReport,
    stem: &str,
    pdf_path: &Path,
    doc_output_dir: &Path,
) -> DocumentSummary {
    DocumentSummary {
        kind: crate::classify::DocumentKind::Vector,
        total_pages: report.total_pages,
        pdf_name: stem.to_string(),
        pdf_path: pdf_path.to_path_buf(),
        processed_files: report
            .text_content
            .iter()
            .enumerate()
            .map(|(i, text)| ProcessedFile {
                page_number: i + 1,
                file_path: doc_output_dir.join(format!("page_{}_text.txt", i + 1)),
                file_type: FileKind::Text,
                content_length: Some(text.len()),
            })
            .collect(),
        metadata: Some(report.metadata),
    }
}

/// Persist the summary atomically (temp file + rename) so readers never see
/// a half-written report.
async fn write_summary(output_dir: &Path, summary: &BatchSummary) -> Result<(), PdfTriageError> {
    let path = output_dir.join(RESULTS_FILE_NAME);

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| PdfTriageError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| PdfTriageError::Internal(format!("serialising summary: {e}")))?;

    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, &json)
        .await
        .map_err(|e| PdfTriageError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;
    tokio::fs::rename(&tmp_path, &path)
        .await
        .map_err(|e| PdfTriageError::OutputWriteFailed {
            path: path.clone(),
            source: e,
        })?;

    info!("Wrote {}", path.display());
    Ok(())
}
