//! CLI binary for pdftriage.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ProcessingConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdftriage::{
    inspect, process_directory, process_document, BatchOutcome, DocumentEntry, DocumentReport,
    ProcessingConfig, ProcessingProgressCallback, ProgressCallback, RESULTS_FILE_NAME,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar over pages (single-document mode)
/// or over documents (batch mode). Designed to work correctly when jobs
/// complete out of order.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Set once `on_batch_start` fires: page events then only feed log
    /// lines, the bar advances per document.
    batch_mode: AtomicBool,
}

impl CliProgressCallback {
    /// Create a callback whose bar length is set by the first start event.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            batch_mode: AtomicBool::new(false),
        })
    }

    /// Switch to the full progress-bar style once a total is known.
    fn activate_bar(&self, total: usize, prefix: &'static str, unit: &'static str) {
        let progress_style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  \
             [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {unit}  ⏱ {{elapsed_precise}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix);
    }
}

impl ProcessingProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.batch_mode.store(true, Ordering::SeqCst);
        self.activate_bar(total_documents, "Processing", "documents");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total_documents} PDF(s)…"))
        ));
    }

    fn on_pipeline_start(&self, total_pages: usize) {
        if !self.batch_mode.load(Ordering::SeqCst) {
            self.activate_bar(total_pages, "Processing", "pages");
        }
    }

    fn on_page_complete(&self, page_num: usize, total: usize, output_len: usize) {
        if self.batch_mode.load(Ordering::SeqCst) {
            return;
        }
        let detail = if output_len > 0 {
            dim(&format!("{output_len:>5} chars"))
        } else {
            dim("image")
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_num,
            total,
            detail,
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: String) {
        // Truncate very long error messages to keep output tidy.
        let msg = if error.chars().count() > 80 {
            let truncated: String = error.chars().take(79).collect();
            format!("{truncated}\u{2026}")
        } else {
            error
        };
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
        ));
        if !self.batch_mode.load(Ordering::SeqCst) {
            self.bar.inc(1);
        }
    }

    fn on_pipeline_complete(&self, total_pages: usize, success_count: usize) {
        if self.batch_mode.load(Ordering::SeqCst) {
            return;
        }
        self.bar.finish_and_clear();
        let failed = total_pages.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} pages processed successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages processed  ({} failed)",
                cyan("⚠"),
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }

    fn on_document_complete(&self, pdf_name: String, success: bool) {
        if !self.batch_mode.load(Ordering::SeqCst) {
            return;
        }
        let mark = if success { green("✓") } else { red("✗") };
        self.bar.println(format!("  {mark} {pdf_name}"));
        self.bar.inc(1);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process every PDF in a directory
  pdftriage pdfs/ -o output

  # Process a single document
  pdftriage scan.pdf -o output/scan

  # Cap raster documents at 10 pages, use 8 workers
  pdftriage pdfs/ --max-pages 10 -w 8

  # Classification and metadata only, no outputs
  pdftriage document.pdf --classify-only

  # Machine-readable output
  pdftriage pdfs/ --json > results.json

OUTPUT LAYOUT (batch mode):
  <output>/<doc-stem>/page_<n>_processed.png   raster documents
  <output>/<doc-stem>/page_<n>_text.txt        vector documents (non-empty pages)
  <output>/processing_results.json             aggregate summary

CLASSIFICATION:
  A document with extractable text on its first page is vector. Otherwise the
  first page is rendered and a Canny edge-density above 0.95 means raster;
  everything else (including blank pages) is vector.

ENVIRONMENT VARIABLES:
  PDFTRIAGE_OUTPUT       Default output directory
  PDFTRIAGE_MAX_PAGES    Default raster page cap
  PDFTRIAGE_WORKERS      Default worker count
"#;

/// Classify PDFs as raster or vector and extract page images or text.
#[derive(Parser, Debug)]
#[command(
    name = "pdftriage",
    version,
    about = "Classify PDFs as raster or vector and extract page images or text",
    long_about = "Classify PDF documents as raster (scanned) or vector (text-based), then run the \
matching extraction pipeline: adaptive binarization of page images for raster documents, \
per-page text extraction for vector documents. Accepts a single file or a directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file or a directory of PDFs.
    input: PathBuf,

    /// Output directory.
    #[arg(short, long, env = "PDFTRIAGE_OUTPUT", default_value = "output")]
    output: PathBuf,

    /// Cap on pages processed per raster document (vector documents are
    /// always processed in full).
    #[arg(long, env = "PDFTRIAGE_MAX_PAGES")]
    max_pages: Option<usize>,

    /// Number of concurrent page/document jobs.
    #[arg(short, long, env = "PDFTRIAGE_WORKERS", default_value_t = 4)]
    workers: usize,

    /// Classify and print metadata only; write nothing.
    #[arg(long)]
    classify_only: bool,

    /// Output structured JSON instead of human-readable text.
    #[arg(long, env = "PDFTRIAGE_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFTRIAGE_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFTRIAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFTRIAGE_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.classify_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Classify-only mode ───────────────────────────────────────────────
    if cli.classify_only {
        let profile = inspect(&cli.input).await.context("Failed to classify PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&profile).context("Failed to serialise profile")?
            );
        } else {
            println!("File:   {}", cli.input.display());
            println!("Type:   {}", profile.kind);
            println!("Pages:  {}", profile.page_count);
            for (key, value) in &profile.metadata {
                println!("{key}: {value}");
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ProcessingProgressCallback>)
    } else {
        None
    };

    let mut builder = ProcessingConfig::builder().workers(cli.workers);
    if let Some(cap) = cli.max_pages {
        builder = builder.max_pages(cap);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Dispatch: directory → batch, file → single document ──────────────
    if cli.input.is_dir() {
        run_batch(&cli, &config).await
    } else {
        run_single(&cli, &config).await
    }
}

async fn run_single(cli: &Cli, config: &ProcessingConfig) -> Result<()> {
    let (kind, report) = process_document(&cli.input, &cli.output, config)
        .await
        .context("Processing failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
        return Ok(());
    }

    if cli.quiet {
        return Ok(());
    }

    println!("PDF Type: {kind}");
    println!("Total Pages in PDF: {}", report.total_pages());
    println!("Pages Processed: {}", report.pages_processed());

    match report {
        DocumentReport::Raster(r) => {
            println!("\nProcessed Images:");
            for img in &r.processed_images {
                println!("- {}", img.file_path.display());
            }
        }
        DocumentReport::Vector(r) => {
            println!("\nExtracted Text Files:");
            for (i, text) in r.text_content.iter().enumerate() {
                if !text.trim().is_empty() {
                    println!("- Page {}: {} characters", i + 1, text.len());
                }
            }
            if !r.metadata.is_empty() {
                println!("\nPDF Metadata:");
                for (key, value) in &r.metadata {
                    println!("- {key}: {value}");
                }
            }
        }
    }

    Ok(())
}

async fn run_batch(cli: &Cli, config: &ProcessingConfig) -> Result<()> {
    let outcome = process_directory(&cli.input, &cli.output, config)
        .await
        .context("Batch processing failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialise summary")?
        );
        return Ok(());
    }

    let summary = match outcome {
        BatchOutcome::Error { error } => anyhow::bail!("{error}"),
        BatchOutcome::Summary(s) => s,
    };

    if cli.quiet {
        return Ok(());
    }

    println!("\nProcessing Summary:");
    println!("Total PDFs: {}", summary.total_pdfs);
    println!("Successfully processed: {}", summary.successful_processing);
    println!("Failed to process: {}", summary.failed_processing);

    println!("\nDetailed Results:");
    for entry in &summary.results {
        match entry {
            DocumentEntry::Failed {
                pdf_name, error, ..
            } => {
                println!("\nPDF: {pdf_name}");
                println!("{}", red(&format!("Error: {error}")));
            }
            DocumentEntry::Processed(doc) => {
                println!("\nPDF: {}", doc.pdf_name);
                println!("Type: {}", doc.kind);
                println!("Total Pages: {}", doc.total_pages);
                println!("Processed Files:");
                for file in &doc.processed_files {
                    println!("- Page {}: {}", file.page_number, file.file_path.display());
                }
            }
        }
    }

    println!(
        "\nComplete results saved to: {}",
        cli.output.join(RESULTS_FILE_NAME).display()
    );

    Ok(())
}
