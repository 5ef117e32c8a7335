//! Accelerograph record parsing.
//!
//! A record file holds one sample per line, preceded by header lines that
//! start with a fixed marker (`EVENT_NAME`, `STATION`, `#`). Lines that fail
//! numeric conversion are dropped without aborting the parse, since real
//! files often carry trailing garbage.

use crate::constants::{DEFAULT_MAX_SAMPLES, HEADER_MARKERS, HEAVY_TRUNCATION_RATIO};
use crate::error::{AfadError, Result};
use crate::models::TimeSeries;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Line accounting for one parsed record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub lines_read: usize,
    pub header_lines: usize,
    pub malformed_lines: usize,
    /// Numeric samples found before truncation
    pub samples_found: usize,
    /// Samples dropped from the tail by the sample limit
    pub samples_truncated: usize,
}

impl ParseStats {
    pub fn is_truncated(&self) -> bool {
        self.samples_truncated > 0
    }
}

/// A successfully parsed record file
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecord {
    pub path: PathBuf,
    pub series: TimeSeries,
    pub stats: ParseStats,
}

/// Parser for record files with a fixed sample limit
#[derive(Debug, Clone, Copy)]
pub struct RecordParser {
    max_samples: usize,
}

impl Default for RecordParser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SAMPLES)
    }
}

impl RecordParser {
    pub fn new(max_samples: usize) -> Self {
        Self { max_samples }
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    /// Parse one record file into a time series
    ///
    /// Keeps the first `max_samples` samples. Fails with `FileNotFound` when
    /// the path does not exist and `EmptyOrUnparsable` when no numeric sample
    /// survives filtering.
    pub fn parse(&self, path: &Path) -> Result<ParsedRecord> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AfadError::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(AfadError::Io(e)),
        };
        let mut reader = BufReader::new(file);

        let mut samples = Vec::new();
        let mut stats = ParseStats::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            stats.lines_read += 1;

            let line = String::from_utf8_lossy(&buf);
            match classify_line(&line) {
                Line::Header => stats.header_lines += 1,
                Line::Malformed => stats.malformed_lines += 1,
                Line::Sample(value) => {
                    stats.samples_found += 1;
                    if samples.len() < self.max_samples {
                        samples.push(value);
                    }
                }
            }
        }

        if samples.is_empty() {
            return Err(AfadError::EmptyOrUnparsable {
                path: path.to_path_buf(),
                lines_read: stats.lines_read,
            });
        }

        stats.samples_truncated = stats.samples_found - samples.len();
        if stats.is_truncated() {
            let dropped_ratio = stats.samples_truncated as f64 / stats.samples_found as f64;
            if dropped_ratio > HEAVY_TRUNCATION_RATIO {
                warn!(
                    "Heavy truncation in {}: kept {} of {} samples",
                    path.display(),
                    samples.len(),
                    stats.samples_found
                );
            } else {
                debug!(
                    "Truncated {}: kept {} of {} samples",
                    path.display(),
                    samples.len(),
                    stats.samples_found
                );
            }
        }

        debug!(
            "Parsed {}: {} samples, {} header lines, {} malformed lines",
            path.display(),
            samples.len(),
            stats.header_lines,
            stats.malformed_lines
        );

        Ok(ParsedRecord {
            path: path.to_path_buf(),
            series: TimeSeries::new(samples),
            stats,
        })
    }
}

enum Line {
    Header,
    Malformed,
    Sample(f64),
}

fn classify_line(raw: &str) -> Line {
    let line = raw.trim();

    if line.is_empty() || HEADER_MARKERS.iter().any(|marker| line.starts_with(marker)) {
        return Line::Header;
    }

    match line.parse::<f64>() {
        Ok(value) if value.is_finite() => Line::Sample(value),
        _ => Line::Malformed,
    }
}
