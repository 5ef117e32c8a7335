//! Batch summarization across many events.
//!
//! Summarizes events concurrently on the tokio blocking pool, sharing one
//! [`SharedRecordCache`] between workers. Each event is isolated: a failed
//! record only shows up in that event's failure list.

#[cfg(test)]
pub mod tests;

use crate::cache::{RecordStore, SharedRecordCache};
use crate::catalog::Catalog;
use crate::config::AfadConfig;
use crate::error::{AfadError, Result};
use crate::metadata::metadata_for;
use crate::metrics::MetricEngine;
use crate::models::{
    EventId, EventMetadata, EventSummaryTable, ProcessingStats, RecordFailure, StationSummary,
};

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Metadata and station summaries for one event
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    pub metadata: EventMetadata,
    pub table: EventSummaryTable,
}

/// Result of a batch run, ordered by event id
#[derive(Debug, Default)]
pub struct BatchReport {
    pub events: Vec<EventReport>,
    pub stats: ProcessingStats,
}

impl BatchReport {
    pub fn metadata(&self) -> Vec<EventMetadata> {
        self.events.iter().map(|e| e.metadata.clone()).collect()
    }

    pub fn station_rows(&self) -> Vec<StationSummary> {
        self.events
            .iter()
            .flat_map(|e| e.table.rows.iter().cloned())
            .collect()
    }

    pub fn failures(&self) -> Vec<RecordFailure> {
        self.events
            .iter()
            .flat_map(|e| e.table.failures.iter().cloned())
            .collect()
    }
}

/// Metadata and summary table for one event
pub fn summarize_event<S: RecordStore + ?Sized>(store: &S, event: &EventId) -> EventReport {
    let catalog = store.catalog();
    if !catalog.contains_event(event.as_str()) {
        warn!("Event {} not found in catalog", event);
    }

    EventReport {
        metadata: metadata_for(&catalog, event),
        table: MetricEngine::new(store).event_summary_table(event),
    }
}

/// Concurrent summarizer over a shared cache
#[derive(Debug)]
pub struct BatchProcessor {
    config: AfadConfig,
    store: Arc<SharedRecordCache>,
}

impl BatchProcessor {
    /// Create a processor with a fresh cache
    pub fn new(config: AfadConfig) -> Result<Self> {
        let store = Arc::new(SharedRecordCache::from_config(&config)?);
        Ok(Self { config, store })
    }

    /// Create a processor over an existing cache
    pub fn with_store(config: AfadConfig, store: Arc<SharedRecordCache>) -> Self {
        Self { config, store }
    }

    pub fn store(&self) -> &Arc<SharedRecordCache> {
        &self.store
    }

    pub fn config(&self) -> &AfadConfig {
        &self.config
    }

    /// Discover (or fetch the cached) catalog without blocking the runtime
    pub async fn discover(&self) -> Result<Arc<Catalog>> {
        let store = Arc::clone(&self.store);
        task::spawn_blocking(move || store.catalog())
            .await
            .map_err(|e| AfadError::ProcessingFailed {
                path: self.describe_roots(),
                reason: format!("discovery task failed: {}", e),
            })
    }

    /// Summarize every event in the catalog
    pub async fn process_all(&self) -> Result<BatchReport> {
        let catalog = self.discover().await?;
        let events: Vec<EventId> = catalog.event_ids().cloned().collect();
        self.process_events(events).await
    }

    /// Summarize the given events
    pub async fn process_events(&self, events: Vec<EventId>) -> Result<BatchReport> {
        let start_time = Instant::now();
        let catalog = self.discover().await?;

        info!(
            "Summarizing {} events ({} in catalog, {} record files)",
            events.len(),
            catalog.event_count(),
            catalog.file_count()
        );

        let progress_bar = self.progress_bar(events.len() as u64);

        let results = stream::iter(events)
            .map(|event| {
                let store = Arc::clone(&self.store);
                let progress_bar = progress_bar.clone();
                async move {
                    let task_event = event.clone();
                    let result =
                        task::spawn_blocking(move || summarize_event(&*store, &task_event))
                            .await;
                    progress_bar.inc(1);
                    result.map_err(|e| AfadError::ProcessingFailed {
                        path: PathBuf::from(event.as_str()),
                        reason: format!("summary task failed: {}", e),
                    })
                }
            })
            .buffer_unordered(self.config.workers.max(1))
            .collect::<Vec<_>>()
            .await;

        progress_bar.finish_and_clear();

        let mut reports = results.into_iter().collect::<Result<Vec<_>>>()?;
        reports.sort_by(|a, b| a.metadata.event_id.cmp(&b.metadata.event_id));

        let stats = ProcessingStats {
            events_processed: reports.len(),
            stations_processed: reports.iter().map(|r| r.table.rows.len()).sum(),
            records_measured: reports
                .iter()
                .flat_map(|r| r.table.rows.iter())
                .map(StationSummary::measured_count)
                .sum(),
            records_failed: reports.iter().map(|r| r.table.failures.len()).sum(),
            processing_time_ms: start_time.elapsed().as_millis(),
        };

        debug!("Batch complete: {:?}, cache {:?}", stats, self.store.stats());

        Ok(BatchReport {
            events: reports,
            stats,
        })
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} events")
        {
            progress_bar.set_style(style.progress_chars("#>-"));
        }
        progress_bar
    }

    fn describe_roots(&self) -> PathBuf {
        self.config.data_roots.first().cloned().unwrap_or_default()
    }
}
