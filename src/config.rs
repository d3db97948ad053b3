//! Configuration for document and batch processing.
//!
//! All processing behaviour is controlled through [`ProcessingConfig`], built
//! via its [`ProcessingConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config across worker tasks, log it, and diff two
//! runs to understand why their outputs differ.

use crate::error::PdfTriageError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Configuration for a processing run.
///
/// Built via [`ProcessingConfig::builder()`] or using
/// [`ProcessingConfig::default()`].
///
/// # Example
/// ```rust
/// use pdftriage::ProcessingConfig;
///
/// let config = ProcessingConfig::builder()
///     .workers(8)
///     .max_pages(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ProcessingConfig {
    /// Bound on concurrently running jobs. Default: 4.
    ///
    /// Applies independently to each fan-out: page jobs within a raster or
    /// vector run, and document jobs within a batch run. Page work is
    /// CPU-bound (rendering, filtering), so there is little to gain from
    /// raising this far past the core count.
    pub workers: usize,

    /// Cap on the number of pages a raster run will process. Default: no cap.
    ///
    /// Scanned documents can run to hundreds of pages where only the first
    /// few matter; the cap bounds both wall-clock time and output volume.
    /// The vector pipeline ignores it — text extraction is cheap and the
    /// text-content list must cover every page.
    pub max_pages: Option<usize>,

    /// Progress event sink. Default: none.
    ///
    /// See [`crate::progress::ProcessingProgressCallback`]. Events may arrive
    /// from different worker threads and out of page order.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            max_pages: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ProcessingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessingConfig")
            .field("workers", &self.workers)
            .field("max_pages", &self.max_pages)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ProcessingConfig {
    /// Create a new builder for `ProcessingConfig`.
    pub fn builder() -> ProcessingConfigBuilder {
        ProcessingConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ProcessingConfig`].
#[derive(Debug)]
pub struct ProcessingConfigBuilder {
    config: ProcessingConfig,
}

impl ProcessingConfigBuilder {
    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = Some(n);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ProcessingConfig, PdfTriageError> {
        let c = &self.config;
        if c.workers == 0 {
            return Err(PdfTriageError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if c.max_pages == Some(0) {
            return Err(PdfTriageError::InvalidConfig(
                "max_pages must be ≥ 1 when set".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let c = ProcessingConfig::default();
        assert_eq!(c.workers, 4);
        assert!(c.max_pages.is_none());
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn workers_setter_clamps_to_one() {
        let c = ProcessingConfig::builder().workers(0).build().unwrap();
        assert_eq!(c.workers, 1);
    }

    #[test]
    fn zero_page_cap_is_rejected() {
        let mut c = ProcessingConfig::default();
        c.max_pages = Some(0);
        let err = ProcessingConfigBuilder { config: c }.build();
        assert!(err.is_err());
    }

    #[test]
    fn debug_elides_the_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;

        let c = ProcessingConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(dbg.contains("<dyn callback>"), "got: {dbg}");
    }
}
