//! Configuration management and validation.
//!
//! Provides the processing parameters shared by discovery, parsing and batch
//! summarization: where records live, how many samples to keep, and how much
//! concurrency a batch run may use.

use crate::constants::{
    DEFAULT_DATA_ROOTS, DEFAULT_MAX_SAMPLES, DEFAULT_SAMPLING_RATE_HZ, RECORD_EXTENSION,
};
use crate::error::{AfadError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Global configuration for record processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AfadConfig {
    /// Directories scanned for record files, in order
    pub data_roots: Vec<PathBuf>,

    /// Maximum samples kept per record; later samples are dropped
    pub max_samples: usize,

    /// Sampling rate shared by every record (Hz)
    pub sampling_rate_hz: f64,

    /// Number of events summarized concurrently in batch runs
    pub workers: usize,

    /// Record file extension (without the dot)
    pub record_extension: String,

    /// Show a progress bar during batch runs
    pub show_progress: bool,
}

impl Default for AfadConfig {
    fn default() -> Self {
        Self {
            data_roots: DEFAULT_DATA_ROOTS.iter().map(PathBuf::from).collect(),
            max_samples: DEFAULT_MAX_SAMPLES,
            sampling_rate_hz: DEFAULT_SAMPLING_RATE_HZ,
            workers: num_cpus::get(),
            record_extension: RECORD_EXTENSION.to_string(),
            show_progress: false,
        }
    }
}

impl AfadConfig {
    /// Replace the data roots
    pub fn with_data_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.data_roots = roots;
        self
    }

    /// Use a single data root
    pub fn with_data_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.data_roots = vec![root.into()];
        self
    }

    /// Create configuration with a custom sample limit
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Create configuration with a custom sampling rate
    pub fn with_sampling_rate(mut self, sampling_rate_hz: f64) -> Self {
        self.sampling_rate_hz = sampling_rate_hz;
        self
    }

    /// Create configuration with custom worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_progress(mut self) -> Self {
        self.show_progress = true;
        self
    }

    /// Check the configuration before any processing starts
    pub fn validate(&self) -> Result<()> {
        if self.data_roots.is_empty() {
            return Err(AfadError::Configuration {
                message: "at least one data root is required".to_string(),
            });
        }

        if self.max_samples == 0 {
            return Err(AfadError::Configuration {
                message: "max_samples must be greater than zero".to_string(),
            });
        }

        if !self.sampling_rate_hz.is_finite() || self.sampling_rate_hz <= 0.0 {
            return Err(AfadError::Configuration {
                message: format!(
                    "sampling rate must be a positive number of Hz, got {}",
                    self.sampling_rate_hz
                ),
            });
        }

        if self.workers == 0 {
            return Err(AfadError::Configuration {
                message: "workers must be greater than zero".to_string(),
            });
        }

        if self.record_extension.is_empty() || self.record_extension.starts_with('.') {
            return Err(AfadError::Configuration {
                message: format!(
                    "record extension must be non-empty and without a leading dot, got '{}'",
                    self.record_extension
                ),
            });
        }

        debug!(
            "Configuration valid: {} roots, max_samples={}, {} Hz, {} workers",
            self.data_roots.len(),
            self.max_samples,
            self.sampling_rate_hz,
            self.workers
        );

        Ok(())
    }
}
