//! Application constants for the AFAD record processor
//!
//! File naming conventions, record format markers, acquisition defaults and
//! the fixed placeholder values reported for fields the record files cannot
//! provide.

// =============================================================================
// File Naming Conventions
// =============================================================================

/// Extension of accelerograph record files
pub const RECORD_EXTENSION: &str = "asc";

/// Separator between event, station and direction segments in filenames,
/// and between the date and time segments of an event identifier
pub const SEGMENT_SEPARATOR: char = '_';

/// Default data roots, scanned in order
pub const DEFAULT_DATA_ROOTS: &[&str] = &["afad_downloads/data", "afad_downloads/data-2"];

// =============================================================================
// Record Format
// =============================================================================

/// Line prefixes marking header/metadata lines in record files
pub const HEADER_MARKERS: &[&str] = &["EVENT_NAME", "STATION", "#"];

// =============================================================================
// Acquisition Defaults
// =============================================================================

/// Sampling rate of AFAD strong-motion records (Hz)
pub const DEFAULT_SAMPLING_RATE_HZ: f64 = 200.0;

/// Maximum samples kept per record (52.5 seconds at 200 Hz)
pub const DEFAULT_MAX_SAMPLES: usize = 10_500;

/// Fraction of dropped samples above which truncation is logged as a warning
pub const HEAVY_TRUNCATION_RATIO: f64 = 0.5;

// =============================================================================
// Event Identifier Layout
// =============================================================================

/// Number of characters in the `YYYYMMDD` date segment
pub const EVENT_DATE_LEN: usize = 8;

/// Number of characters in the `HHMMSS` time segment
pub const EVENT_TIME_LEN: usize = 6;

// =============================================================================
// Placeholders
// =============================================================================

/// Placeholder geography for events; never derived from record files
pub mod placeholders {
    /// Region reported for every event
    pub const REGION: &str = "Turkey";

    /// Approximate geographic centre of Turkey
    pub const LATITUDE: f64 = 39.0;
    pub const LONGITUDE: f64 = 35.0;
}

// =============================================================================
// Reporting
// =============================================================================

/// Decimal places kept for peak amplitudes in tabular reports
pub const REPORT_DECIMALS: i32 = 4;

/// Label used in reports for values that are unknown
pub const UNKNOWN_LABEL: &str = "Unknown";
