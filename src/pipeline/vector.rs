//! The vector (text-based) pipeline.
//!
//! Every page — no cap — runs a text-extraction job on a blocking worker,
//! bounded by `buffer_unordered` like the raster fan-out. A page job never
//! fails: extraction errors substitute the empty string (with a warning), and
//! text-file write failures are warnings too, so the ordered text list always
//! covers the whole document.
//!
//! Completion order is arbitrary, but the report's `text_content` must match
//! page order — results are re-sorted by page number after the join.

use crate::config::ProcessingConfig;
use crate::error::{PageError, PdfTriageError};
use crate::output::VectorReport;
use crate::pdf::PdfDocument;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

struct VectorPageOutput {
    page_number: u32,
    text: String,
}

/// Extract text from every page of a document.
pub async fn process(
    pdf: Arc<PdfDocument>,
    output_dir: &Path,
    config: &ProcessingConfig,
) -> Result<VectorReport, PdfTriageError> {
    let total_pages = pdf.page_count();
    let page_numbers: Vec<u32> = pdf.page_numbers().collect();

    info!("Extracting text from {} pages", total_pages);
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_start(total_pages);
    }
    let start = Instant::now();

    let mut outputs: Vec<VectorPageOutput> =
        stream::iter(page_numbers.into_iter().map(|page_number| {
            let pdf = Arc::clone(&pdf);
            let out_dir = output_dir.to_path_buf();
            async move {
                tokio::task::spawn_blocking(move || {
                    process_single_page(&pdf, page_number, &out_dir)
                })
                .await
                .unwrap_or_else(|e| {
                    warn!("Page {page_number}: text task panicked: {e}");
                    VectorPageOutput {
                        page_number,
                        text: String::new(),
                    }
                })
            }
        }))
        .buffer_unordered(config.workers)
        .collect()
        .await;

    // Restore original page order before building the text list.
    outputs.sort_by_key(|o| o.page_number);

    let mut pages_with_text = 0;
    let mut total_text_length = 0;
    let mut text_content = Vec::with_capacity(outputs.len());
    for output in outputs {
        if !output.text.trim().is_empty() {
            pages_with_text += 1;
            total_text_length += output.text.len();
        }
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_complete(output.page_number as usize, total_pages, output.text.len());
        }
        text_content.push(output.text);
    }

    info!(
        "Text extraction complete: {}/{} pages with text, {} chars, {}ms",
        pages_with_text,
        total_pages,
        total_text_length,
        start.elapsed().as_millis()
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_pipeline_complete(total_pages, total_pages);
    }

    Ok(VectorReport {
        total_pages,
        pages_processed: total_pages,
        text_content,
        metadata: pdf.metadata(),
        pages_with_text,
        total_text_length,
    })
}

/// Extract one page's text and persist it when non-empty.
///
/// Infallible by design: both extraction and write failures degrade to
/// warnings so a bad page cannot take down the run.
fn process_single_page(pdf: &PdfDocument, page_number: u32, output_dir: &Path) -> VectorPageOutput {
    let text = match pdf.extract_page_text(page_number) {
        Ok(text) => text,
        Err(e) => {
            let err = PageError::ExtractFailed {
                page: page_number as usize,
                detail: e.to_string(),
            };
            warn!("{err}");
            String::new()
        }
    };

    if !text.trim().is_empty() {
        let file_path = output_dir.join(format!("page_{page_number}_text.txt"));
        if let Err(e) = std::fs::write(&file_path, &text) {
            warn!("Page {page_number}: saving {} failed: {e}", file_path.display());
        }
    }

    VectorPageOutput { page_number, text }
}
