//! Pipeline stages for per-page PDF processing.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the rendering approximation) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! raster:  render ──▶ filters ──▶ page_<n>_processed.png
//!          (canvas)   (gray + adaptive threshold)
//!
//! vector:  extract ──▶ page_<n>_text.txt + ordered text list
//!          (lopdf)
//! ```
//!
//! 1. [`render`]  — composite a page's embedded raster images onto a white
//!    media-box canvas; an approximation, not full PDF rendering
//! 2. [`filters`] — grayscale conversion, Canny edge density, and the
//!    mean-offset adaptive binarization
//! 3. [`raster`]  — the capped, concurrent scanned-document pipeline
//! 4. [`vector`]  — the concurrent text-extraction pipeline

pub mod filters;
pub mod raster;
pub mod render;
pub mod vector;
