//! AFAD Record Processor Library
//!
//! A Rust library for turning AFAD strong-motion accelerograph records into
//! clean time series and peak ground acceleration summaries.
//!
//! This library provides tools for:
//! - Discovering events, stations and directions from record filenames
//! - Parsing record files with header skipping and tolerant line handling
//! - Inferring event dates and times from event identifiers
//! - Computing per-station, per-direction peak amplitudes with explicit
//!   "no data" flags
//! - Memoizing discovery and parse results for the lifetime of a process
//! - Summarizing many events concurrently and writing tabular reports

pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod metadata;
pub mod metrics;
pub mod models;
pub mod parser;
pub mod processor;
pub mod remote;
pub mod report;

// Re-export commonly used types
pub use cache::{RecordCache, RecordStore, SharedRecordCache};
pub use catalog::{Catalog, PathCatalog};
pub use config::AfadConfig;
pub use error::{AfadError, FailureKind, Result};
pub use metadata::metadata_for;
pub use metrics::{MetricEngine, peak_amplitude};
pub use models::{
    Direction, EventId, EventMetadata, EventSummaryTable, Inferred, PeakReading, StationCode,
    StationSummary, TimeSeries,
};
pub use parser::{ParsedRecord, RecordParser};
pub use processor::{BatchProcessor, BatchReport};
