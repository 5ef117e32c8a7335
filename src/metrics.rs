//! Peak ground acceleration and per-station summaries.
//!
//! Summaries never fail: a direction whose file is missing or unparsable is
//! recorded as [`PeakReading::NoData`] and listed in the table's failures,
//! so one bad file cannot abort a multi-station summary.

use crate::cache::RecordStore;
use crate::error::FailureKind;
use crate::models::{
    Direction, EventId, EventSummaryTable, PeakReading, RecordFailure, StationCode,
    StationSummary,
};
use crate::parser::ParsedRecord;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maximum absolute value over all samples; 0.0 for an empty series
pub fn peak_amplitude(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0_f64, |peak, v| peak.max(v.abs()))
}

/// Computes summaries from a record store
#[derive(Debug)]
pub struct MetricEngine<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> MetricEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Peak amplitude of one direction, with the failure if there is no data
    pub fn direction_peak(
        &self,
        event: &EventId,
        station: &StationCode,
        direction: Direction,
    ) -> (PeakReading, Option<RecordFailure>) {
        let catalog = self.store.catalog();
        let Some(path) = catalog.file_for(event.as_str(), station.as_str(), direction) else {
            debug!("No {} record for {} at {}", direction, event, station);
            let failure = RecordFailure {
                event_id: event.clone(),
                station: station.clone(),
                direction,
                path: None,
                kind: FailureKind::NotFound,
                message: format!("no {} record in catalog", direction),
            };
            return (
                PeakReading::NoData {
                    reason: FailureKind::NotFound,
                },
                Some(failure),
            );
        };

        match self.store.record(path) {
            Ok(record) => (
                PeakReading::Measured {
                    pga: record.series.peak_amplitude(),
                    samples: record.series.len(),
                    truncated: record.stats.is_truncated(),
                },
                None,
            ),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                let kind = e.failure_kind();
                let failure = RecordFailure {
                    event_id: event.clone(),
                    station: station.clone(),
                    direction,
                    path: Some(path.to_path_buf()),
                    kind,
                    message: e.to_string(),
                };
                (PeakReading::NoData { reason: kind }, Some(failure))
            }
        }
    }

    /// Peak amplitudes in all three directions for one station
    pub fn station_summary(&self, event: &EventId, station: &StationCode) -> StationSummary {
        self.summarize_station(event, station).0
    }

    fn summarize_station(
        &self,
        event: &EventId,
        station: &StationCode,
    ) -> (StationSummary, Vec<RecordFailure>) {
        let mut failures = Vec::new();
        let mut peak = |direction| {
            let (reading, failure) = self.direction_peak(event, station, direction);
            failures.extend(failure);
            reading
        };

        let summary = StationSummary {
            event_id: event.clone(),
            station: station.clone(),
            north: peak(Direction::North),
            east: peak(Direction::East),
            up: peak(Direction::Up),
        };
        (summary, failures)
    }

    /// One summary row per catalog station, in catalog order, plus failures
    pub fn event_summary_table(&self, event: &EventId) -> EventSummaryTable {
        let stations = self.store.catalog().stations(event.as_str());
        let mut rows = Vec::with_capacity(stations.len());
        let mut failures = Vec::new();

        for station in &stations {
            let (row, station_failures) = self.summarize_station(event, station);
            rows.push(row);
            failures.extend(station_failures);
        }

        debug!(
            "Summarized event {}: {} stations, {} failed records",
            event,
            rows.len(),
            failures.len()
        );

        EventSummaryTable {
            event_id: event.clone(),
            rows,
            failures,
        }
    }

    /// Parsed signal for one direction of an event
    ///
    /// With a station, reads that station's file; without, reads the first
    /// file for the direction in catalog order. `None` when there is no such
    /// file or it cannot be parsed.
    pub fn event_signal(
        &self,
        event: &EventId,
        direction: Direction,
        station: Option<&StationCode>,
    ) -> Option<Arc<ParsedRecord>> {
        let catalog = self.store.catalog();
        let path = match station {
            Some(station) => catalog.file_for(event.as_str(), station.as_str(), direction),
            None => catalog
                .files_for_direction(event.as_str(), direction)
                .first()
                .copied(),
        }?;

        match self.store.record(path) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Signal unavailable from {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RecordCache;
    use crate::catalog::PathCatalog;
    use crate::parser::RecordParser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_corpus(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("data");
        fs::create_dir_all(&root).unwrap();

        // STA1 has all three directions
        fs::write(root.join("EVT1_STA1_N.asc"), "EVENT_NAME: EVT1\n0.1\n-0.5\n0.3\n").unwrap();
        fs::write(root.join("EVT1_STA1_E.asc"), "0.2\n-0.25\n").unwrap();
        fs::write(root.join("EVT1_STA1_U.asc"), "0.0\n0.0\n").unwrap();

        // STA2 is missing East and has an unparsable Up record
        fs::write(root.join("EVT1_STA2_N.asc"), "1.5\n-2.0\n").unwrap();
        fs::write(root.join("EVT1_STA2_U.asc"), "# only a comment\n").unwrap();

        root
    }

    fn cache_for(root: PathBuf) -> RecordCache {
        RecordCache::new(PathCatalog::new(vec![root]), RecordParser::default())
    }

    #[test]
    fn test_peak_amplitude() {
        assert_eq!(peak_amplitude(&[-3.0, 1.0, 2.5]), 3.0);
        assert_eq!(peak_amplitude(&[]), 0.0);
        assert_eq!(peak_amplitude(&[0.0, -0.0]), 0.0);
    }

    #[test]
    fn test_station_summary_with_all_directions() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_for(create_corpus(&temp_dir));
        let engine = MetricEngine::new(&cache);

        let summary = engine.station_summary(&EventId::new("EVT1"), &StationCode::new("STA1"));

        assert_eq!(summary.north.measured(), Some(0.5));
        assert_eq!(summary.east.measured(), Some(0.25));
        // A genuine zero reading is still measured
        assert_eq!(summary.up.measured(), Some(0.0));
        assert_eq!(summary.measured_count(), 3);
        assert_eq!(summary.document_id(), "EVT1/STA1");
    }

    #[test]
    fn test_station_summary_flags_missing_direction() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_for(create_corpus(&temp_dir));
        let engine = MetricEngine::new(&cache);

        let summary = engine.station_summary(&EventId::new("EVT1"), &StationCode::new("STA2"));

        assert_eq!(summary.north.measured(), Some(2.0));
        assert_eq!(
            summary.east,
            PeakReading::NoData {
                reason: FailureKind::NotFound
            }
        );
        assert_eq!(summary.east.value(), 0.0);
        assert_eq!(
            summary.up,
            PeakReading::NoData {
                reason: FailureKind::Unparsable
            }
        );
    }

    #[test]
    fn test_event_summary_table_collects_failures() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_for(create_corpus(&temp_dir));
        let engine = MetricEngine::new(&cache);

        let table = engine.event_summary_table(&EventId::new("EVT1"));

        let stations: Vec<&str> = table.rows.iter().map(|r| r.station.as_str()).collect();
        assert_eq!(stations, vec!["STA1", "STA2"]);
        assert_eq!(table.failures.len(), 2);
        assert!(!table.is_complete());

        let east = &table.failures[0];
        assert_eq!(east.direction, Direction::East);
        assert_eq!(east.kind, FailureKind::NotFound);
        assert!(east.path.is_none());

        let up = &table.failures[1];
        assert_eq!(up.direction, Direction::Up);
        assert_eq!(up.kind, FailureKind::Unparsable);
        assert!(up.path.is_some());
    }

    #[test]
    fn test_event_summary_table_for_unknown_event() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_for(create_corpus(&temp_dir));
        let engine = MetricEngine::new(&cache);

        let table = engine.event_summary_table(&EventId::new("NOPE"));

        assert!(table.rows.is_empty());
        assert!(table.is_complete());
    }

    #[test]
    fn test_event_signal() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_for(create_corpus(&temp_dir));
        let engine = MetricEngine::new(&cache);
        let event = EventId::new("EVT1");

        // First station in catalog order when none is given
        let first = engine.event_signal(&event, Direction::North, None).unwrap();
        assert_eq!(first.series.samples(), &[0.1, -0.5, 0.3]);

        let sta2 = engine
            .event_signal(&event, Direction::North, Some(&StationCode::new("STA2")))
            .unwrap();
        assert_eq!(sta2.series.samples(), &[1.5, -2.0]);

        assert!(
            engine
                .event_signal(&event, Direction::Up, Some(&StationCode::new("STA2")))
                .is_none()
        );
        assert!(
            engine
                .event_signal(&EventId::new("NOPE"), Direction::North, None)
                .is_none()
        );
    }

    #[test]
    fn test_summaries_reuse_cached_records() {
        let temp_dir = TempDir::new().unwrap();
        let cache = cache_for(create_corpus(&temp_dir));
        let engine = MetricEngine::new(&cache);
        let event = EventId::new("EVT1");

        let first = engine.event_summary_table(&event);
        let second = engine.event_summary_table(&event);

        assert_eq!(first, second);
        let stats = cache.stats();
        assert_eq!(stats.catalog_builds, 1);
        // Four parseable records, each parsed once
        assert_eq!(stats.record_hits, 4);
    }
}
