//! Core data structures and types for record processing.
//!
//! Defines identifiers, recording directions, time series, and the derived
//! event/station records assembled by the metric engine.

use crate::constants::{SEGMENT_SEPARATOR, UNKNOWN_LABEL};
use crate::error::FailureKind;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::PathBuf;

/// Event identifier, by convention `YYYYMMDD_HHMMSS` or `YYYYMMDD...`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Station code, unique within an event's file set
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StationCode(String);

impl StationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_id {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_id!(EventId);
impl_string_id!(StationCode);

/// Recording axis of an accelerograph component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    Up,
}

impl Direction {
    /// All directions in reporting order
    pub const ALL: [Direction; 3] = [Direction::North, Direction::East, Direction::Up];

    /// Filename suffix identifying this component for a record extension
    pub fn suffix(&self, extension: &str) -> String {
        format!("{}{}.{}", SEGMENT_SEPARATOR, self.code(), extension)
    }

    /// Single-letter code used in filenames
    pub fn code(&self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::Up => 'U',
        }
    }

    /// Axis label used in report columns (`PGA_NS` etc.)
    pub fn axis_label(&self) -> &'static str {
        match self {
            Direction::North => "NS",
            Direction::East => "EW",
            Direction::Up => "UD",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Uniformly sampled acceleration record
///
/// The sample interval is not stored; it follows from the configured sampling
/// rate. Every sample is finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    samples: Vec<f64>,
}

impl TimeSeries {
    /// Build a series, dropping any non-finite values
    pub fn new(samples: Vec<f64>) -> Self {
        let samples = if samples.iter().all(|v| v.is_finite()) {
            samples
        } else {
            samples.into_iter().filter(|v| v.is_finite()).collect()
        };
        Self { samples }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum absolute sample value, 0.0 for an empty series
    pub fn peak_amplitude(&self) -> f64 {
        crate::metrics::peak_amplitude(&self.samples)
    }

    /// Sample times in seconds, one per sample, starting at zero
    pub fn time_vector(&self, sampling_rate_hz: f64) -> Vec<f64> {
        let dt = 1.0 / sampling_rate_hz;
        (0..self.samples.len()).map(|i| i as f64 * dt).collect()
    }

    /// Record length in seconds
    pub fn duration_secs(&self, sampling_rate_hz: f64) -> f64 {
        self.samples.len() as f64 / sampling_rate_hz
    }
}

/// A value that is either derived from the records, a fixed placeholder, or unknown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Inferred<T> {
    /// Derived from the record files or identifiers
    Known(T),
    /// Fixed placeholder; not a measurement
    Default(T),
    Unknown,
}

impl<T> Inferred<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Inferred::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Inferred::Known(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Inferred::Default(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Inferred::Unknown)
    }

    /// Value regardless of provenance
    pub fn value(&self) -> Option<&T> {
        match self {
            Inferred::Known(value) | Inferred::Default(value) => Some(value),
            Inferred::Unknown => None,
        }
    }
}

impl<T: fmt::Display> Inferred<T> {
    /// Display form, with `Unknown` for missing values
    pub fn label(&self) -> String {
        match self.value() {
            Some(value) => value.to_string(),
            None => UNKNOWN_LABEL.to_string(),
        }
    }
}

/// Geographic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Metadata derived for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    pub event_id: EventId,
    pub date: Inferred<NaiveDate>,
    pub time: Inferred<NaiveTime>,
    pub station_count: usize,
    pub stations: Vec<StationCode>,
    pub region: Inferred<String>,
    pub location: Inferred<GeoPoint>,
    pub magnitude: Inferred<f64>,
    pub depth_km: Inferred<f64>,
}

impl EventMetadata {
    /// Stable identifier for document stores
    pub fn document_id(&self) -> String {
        self.event_id.to_string()
    }

    /// Date as `YYYY-MM-DD`, or `Unknown`
    pub fn date_label(&self) -> String {
        match self.date.value() {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => UNKNOWN_LABEL.to_string(),
        }
    }

    /// Time as `HH:MM:SS`, or `Unknown`
    pub fn time_label(&self) -> String {
        match self.time.value() {
            Some(time) => time.format("%H:%M:%S").to_string(),
            None => UNKNOWN_LABEL.to_string(),
        }
    }
}

/// Peak amplitude of one direction, or the reason there is none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PeakReading {
    Measured {
        pga: f64,
        samples: usize,
        truncated: bool,
    },
    /// Peak supplied by the remote analysis service; no local samples back it
    Reported {
        pga: f64,
    },
    NoData {
        reason: FailureKind,
    },
}

impl PeakReading {
    /// Peak value, 0.0 when there is no data
    pub fn value(&self) -> f64 {
        match self {
            PeakReading::Measured { pga, .. } | PeakReading::Reported { pga } => *pga,
            PeakReading::NoData { .. } => 0.0,
        }
    }

    pub fn measured(&self) -> Option<f64> {
        match self {
            PeakReading::Measured { pga, .. } | PeakReading::Reported { pga } => Some(*pga),
            PeakReading::NoData { .. } => None,
        }
    }

    /// True when a peak value exists, whether local or remote
    pub fn is_measured(&self) -> bool {
        !matches!(self, PeakReading::NoData { .. })
    }

    /// Number of local samples behind the peak
    pub fn samples(&self) -> Option<usize> {
        match self {
            PeakReading::Measured { samples, .. } => Some(*samples),
            _ => None,
        }
    }

    /// Length of the local record in seconds at the given sampling rate
    pub fn duration_secs(&self, sampling_rate_hz: f64) -> Option<f64> {
        self.samples()
            .map(|samples| samples as f64 / sampling_rate_hz)
    }
}

/// Per-station peak amplitudes for one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub event_id: EventId,
    pub station: StationCode,
    pub north: PeakReading,
    pub east: PeakReading,
    pub up: PeakReading,
}

impl StationSummary {
    pub fn peak(&self, direction: Direction) -> &PeakReading {
        match direction {
            Direction::North => &self.north,
            Direction::East => &self.east,
            Direction::Up => &self.up,
        }
    }

    /// Stable identifier for document stores
    pub fn document_id(&self) -> String {
        format!("{}/{}", self.event_id, self.station)
    }

    /// Number of directions with measured data
    pub fn measured_count(&self) -> usize {
        Direction::ALL
            .iter()
            .filter(|d| self.peak(**d).is_measured())
            .count()
    }
}

/// A record that produced no data during a batch operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordFailure {
    pub event_id: EventId,
    pub station: StationCode,
    pub direction: Direction,
    pub path: Option<PathBuf>,
    pub kind: FailureKind,
    pub message: String,
}

/// Station summaries for one event, plus the records that failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummaryTable {
    pub event_id: EventId,
    pub rows: Vec<StationSummary>,
    pub failures: Vec<RecordFailure>,
}

impl EventSummaryTable {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Processing statistics for a batch run
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub events_processed: usize,
    pub stations_processed: usize,
    pub records_measured: usize,
    pub records_failed: usize,
    pub processing_time_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_codes_and_suffixes() {
        assert_eq!(Direction::North.suffix("asc"), "_N.asc");
        assert_eq!(Direction::East.suffix("asc"), "_E.asc");
        assert_eq!(Direction::Up.suffix("asc"), "_U.asc");
        assert_eq!(Direction::Up.suffix("txt"), "_U.txt");
        assert_eq!(Direction::North.to_string(), "N");
        assert_eq!(Direction::Up.axis_label(), "UD");
    }

    #[test]
    fn test_time_series_drops_non_finite() {
        let series = TimeSeries::new(vec![0.1, f64::NAN, -0.2, f64::INFINITY]);
        assert_eq!(series.samples(), &[0.1, -0.2]);
    }

    #[test]
    fn test_time_vector_matches_length() {
        let series = TimeSeries::new(vec![0.0; 5]);
        let times = series.time_vector(200.0);
        assert_eq!(times.len(), 5);
        assert_eq!(times[0], 0.0);
        assert!((times[4] - 0.02).abs() < 1e-12);
        assert!((series.duration_secs(200.0) - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_inferred_labels() {
        let known: Inferred<u32> = Inferred::Known(3);
        let default: Inferred<u32> = Inferred::Default(7);
        let unknown: Inferred<u32> = Inferred::Unknown;

        assert_eq!(known.label(), "3");
        assert_eq!(default.label(), "7");
        assert_eq!(unknown.label(), "Unknown");
        assert_eq!(default.known(), None);
        assert!(default.is_default());
    }

    #[test]
    fn test_peak_reading_distinguishes_no_data_from_zero() {
        let zero = PeakReading::Measured {
            pga: 0.0,
            samples: 10,
            truncated: false,
        };
        let missing = PeakReading::NoData {
            reason: FailureKind::NotFound,
        };

        assert_eq!(zero.value(), missing.value());
        assert_eq!(zero.measured(), Some(0.0));
        assert_eq!(missing.measured(), None);
    }

    #[test]
    fn test_reported_peak_has_no_local_samples() {
        let reported = PeakReading::Reported { pga: 0.75 };
        let local = PeakReading::Measured {
            pga: 0.75,
            samples: 400,
            truncated: false,
        };

        assert_eq!(reported.measured(), Some(0.75));
        assert!(reported.is_measured());
        assert_eq!(reported.samples(), None);
        assert_eq!(reported.duration_secs(200.0), None);

        assert_eq!(local.samples(), Some(400));
        assert_eq!(local.duration_secs(200.0), Some(2.0));
        assert_eq!(local.duration_secs(100.0), Some(4.0));
    }
}
