//! Batch summarization tests

use super::create_two_event_corpus;
use crate::cache::RecordStore;
use crate::config::AfadConfig;
use crate::error::FailureKind;
use crate::models::{Direction, EventId};
use crate::processor::BatchProcessor;
use tempfile::TempDir;

fn processor_for(root: std::path::PathBuf) -> BatchProcessor {
    let config = AfadConfig::default().with_data_root(root).with_workers(2);
    BatchProcessor::new(config).unwrap()
}

#[tokio::test]
async fn test_process_all_events() {
    let temp_dir = TempDir::new().unwrap();
    let processor = processor_for(create_two_event_corpus(&temp_dir));

    let report = processor.process_all().await.unwrap();

    let ids: Vec<&str> = report
        .events
        .iter()
        .map(|e| e.metadata.event_id.as_str())
        .collect();
    assert_eq!(ids, vec!["20230206_043717", "20230206_132441"]);

    assert_eq!(report.stats.events_processed, 2);
    assert_eq!(report.stats.stations_processed, 3);
    assert_eq!(report.stats.records_measured, 7);
    assert_eq!(report.stats.records_failed, 2);
}

#[tokio::test]
async fn test_event_metadata_and_peaks() {
    let temp_dir = TempDir::new().unwrap();
    let processor = processor_for(create_two_event_corpus(&temp_dir));

    let report = processor.process_all().await.unwrap();
    let first = &report.events[0];

    assert_eq!(first.metadata.date_label(), "2023-02-06");
    assert_eq!(first.metadata.time_label(), "04:37:17");
    assert_eq!(first.metadata.station_count, 2);

    let rows = &first.table.rows;
    assert_eq!(rows[0].station.as_str(), "0213");
    assert_eq!(rows[0].north.measured(), Some(1.25));
    assert!(!rows[0].east.is_measured());
    assert_eq!(rows[1].station.as_str(), "4614");
    assert_eq!(rows[1].north.measured(), Some(0.5));
    assert_eq!(rows[1].east.measured(), Some(0.4));
    assert_eq!(rows[1].up.measured(), Some(0.05));
}

#[tokio::test]
async fn test_process_selected_events() {
    let temp_dir = TempDir::new().unwrap();
    let processor = processor_for(create_two_event_corpus(&temp_dir));

    let report = processor
        .process_events(vec![EventId::new("20230206_132441")])
        .await
        .unwrap();

    assert_eq!(report.events.len(), 1);
    let event = &report.events[0];
    assert_eq!(event.metadata.time_label(), "13:24:41");
    assert_eq!(event.table.rows[0].north.measured(), Some(2.5));
    assert_eq!(event.table.failures.len(), 1);
    assert_eq!(event.table.failures[0].direction, Direction::Up);
    assert_eq!(event.table.failures[0].kind, FailureKind::Unparsable);
}

#[tokio::test]
async fn test_repeated_runs_use_cache() {
    let temp_dir = TempDir::new().unwrap();
    let processor = processor_for(create_two_event_corpus(&temp_dir));

    let first = processor.process_all().await.unwrap();
    let misses_after_first = processor.store().stats().record_misses;
    let second = processor.process_all().await.unwrap();

    assert_eq!(first.events, second.events);
    let stats = processor.store().stats();
    assert_eq!(stats.catalog_builds, 1);
    // Only the unparsable record is read again
    assert_eq!(stats.record_misses, misses_after_first + 1);
}

#[tokio::test]
async fn test_report_accessors() {
    let temp_dir = TempDir::new().unwrap();
    let processor = processor_for(create_two_event_corpus(&temp_dir));

    let report = processor.process_all().await.unwrap();

    assert_eq!(report.metadata().len(), 2);
    assert_eq!(report.station_rows().len(), 3);
    assert_eq!(report.failures().len(), 2);
}
