//! Command-line interface components.

use crate::config::AfadConfig;
use crate::models::EventId;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "afad")]
#[command(about = "Summarize AFAD strong-motion records: events, stations and peak ground acceleration")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directories containing record files (defaults to afad_downloads/data and data-2)
    #[arg(value_name = "DATA_ROOT")]
    pub data_roots: Vec<PathBuf>,

    /// Only summarize these events (repeatable)
    #[arg(short, long = "event", value_name = "EVENT_ID")]
    pub events: Vec<String>,

    /// List events and their metadata without parsing records
    #[arg(long)]
    pub list_only: bool,

    /// Maximum samples kept per record
    #[arg(long)]
    pub max_samples: Option<usize>,

    /// Sampling rate of the records in Hz
    #[arg(long)]
    pub sampling_rate: Option<f64>,

    /// Number of events summarized concurrently
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Write station summaries to this file (.csv or .parquet)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write event metadata to this file (.csv or .parquet)
    #[arg(long)]
    pub events_output: Option<PathBuf>,

    /// Write failed records to this file (.csv or .parquet)
    #[arg(long)]
    pub failures_output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Build the processing configuration from the arguments
    pub fn to_config(&self) -> AfadConfig {
        let mut config = AfadConfig::default();

        if !self.data_roots.is_empty() {
            config = config.with_data_roots(self.data_roots.clone());
        }
        if let Some(max_samples) = self.max_samples {
            config = config.with_max_samples(max_samples);
        }
        if let Some(rate) = self.sampling_rate {
            config = config.with_sampling_rate(rate);
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if !self.verbose {
            config = config.with_progress();
        }

        config
    }

    /// Requested event ids, if any were given
    pub fn event_ids(&self) -> Option<Vec<EventId>> {
        if self.events.is_empty() {
            None
        } else {
            Some(self.events.iter().map(|e| EventId::new(e.as_str())).collect())
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}
