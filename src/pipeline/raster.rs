//! The raster (scanned-document) pipeline.
//!
//! Every attempted page runs the same job: rasterise → grayscale → adaptive
//! binarization → write `page_<n>_processed.png`. Jobs are CPU-bound, so each
//! one runs under `spawn_blocking` and the fan-out is bounded with
//! `buffer_unordered` — at most `config.workers` pages are in flight, and the
//! join delivers each result exactly once regardless of completion order.
//!
//! Per-page failures are recorded and excluded from the output list; they
//! never abort sibling pages. The report's `pages_processed` stays the
//! attempted count even when pages fail — callers wanting the success count
//! take `processed_images.len()`.

use crate::config::ProcessingConfig;
use crate::error::{PageError, PdfTriageError};
use crate::output::{RasterPageOutput, RasterReport};
use crate::pdf::PdfDocument;
use crate::pipeline::{filters, render};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Process a scanned document into binarized page images.
///
/// `pages_processed = min(total_pages, config.max_pages)`; pages beyond the
/// cap are never attempted.
pub async fn process(
    pdf: Arc<PdfDocument>,
    output_dir: &Path,
    config: &ProcessingConfig,
) -> Result<RasterReport, PdfTriageError> {
    let total_pages = pdf.page_count();
    let pages_to_process = match config.max_pages {
        Some(cap) => total_pages.min(cap),
        None => total_pages,
    };
    let page_numbers: Vec<u32> = pdf.page_numbers().take(pages_to_process).collect();

    info!(
        "Processing {} of {} pages as raster",
        pages_to_process, total_pages
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_start(pages_to_process);
    }
    let start = Instant::now();

    let results: Vec<Result<RasterPageOutput, PageError>> =
        stream::iter(page_numbers.into_iter().map(|page_number| {
            let pdf = Arc::clone(&pdf);
            let out_dir = output_dir.to_path_buf();
            async move {
                tokio::task::spawn_blocking(move || {
                    process_single_page(&pdf, page_number, &out_dir)
                })
                .await
                .unwrap_or_else(|e| {
                    Err(PageError::FilterFailed {
                        page: page_number as usize,
                        detail: format!("page task panicked: {e}"),
                    })
                })
            }
        }))
        .buffer_unordered(config.workers)
        .collect()
        .await;

    let mut processed_images = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(output) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(output.page_number, pages_to_process, 0);
                }
                processed_images.push(output);
            }
            Err(e) => {
                warn!("{e}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(e.page(), pages_to_process, e.to_string());
                }
            }
        }
    }

    // Completion order is arbitrary; the report lists pages in page order.
    processed_images.sort_by_key(|o| o.page_number);

    info!(
        "Raster run complete: {}/{} pages in {}ms",
        processed_images.len(),
        pages_to_process,
        start.elapsed().as_millis()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_complete(pages_to_process, processed_images.len());
    }

    Ok(RasterReport {
        total_pages,
        pages_processed: pages_to_process,
        processed_images,
    })
}

/// Render, binarize, and save one page. Runs on a blocking worker thread.
fn process_single_page(
    pdf: &PdfDocument,
    page_number: u32,
    output_dir: &Path,
) -> Result<RasterPageOutput, PageError> {
    let canvas = render::rasterize_page(pdf, page_number)?;
    let gray = filters::to_grayscale(&canvas);
    let binarized = filters::adaptive_threshold(
        &gray,
        filters::ADAPTIVE_BLOCK_SIZE,
        filters::ADAPTIVE_OFFSET,
    );

    let file_path: PathBuf = output_dir.join(format!("page_{page_number}_processed.png"));
    binarized.save(&file_path).map_err(|e| PageError::FilterFailed {
        page: page_number as usize,
        detail: format!("saving {}: {e}", file_path.display()),
    })?;

    Ok(RasterPageOutput {
        page_number: page_number as usize,
        file_path,
    })
}
