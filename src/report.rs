//! Tabular reports for downstream consumers.
//!
//! Builds Polars frames from event metadata and station summaries and writes
//! them as CSV or Parquet. Peak values are rounded for presentation only;
//! directions without data are null, with a presence column alongside.
//! Record durations follow from sample counts and the configured sampling rate.

use crate::constants::REPORT_DECIMALS;
use crate::error::{AfadError, Result};
use crate::models::{Direction, EventMetadata, RecordFailure, StationSummary};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

fn round_peak(value: f64) -> f64 {
    let scale = 10f64.powi(REPORT_DECIMALS);
    (value * scale).round() / scale
}

/// One row per event
pub fn events_frame(events: &[EventMetadata]) -> Result<DataFrame> {
    let event_ids: Vec<String> = events.iter().map(|e| e.event_id.to_string()).collect();
    let dates: Vec<Option<String>> = events
        .iter()
        .map(|e| e.date.value().map(|d| d.format("%Y-%m-%d").to_string()))
        .collect();
    let times: Vec<Option<String>> = events
        .iter()
        .map(|e| e.time.value().map(|t| t.format("%H:%M:%S").to_string()))
        .collect();
    let regions: Vec<String> = events.iter().map(|e| e.region.label()).collect();
    let region_placeholder: Vec<bool> = events.iter().map(|e| e.region.is_default()).collect();
    let latitudes: Vec<Option<f64>> = events
        .iter()
        .map(|e| e.location.value().map(|p| p.latitude))
        .collect();
    let longitudes: Vec<Option<f64>> = events
        .iter()
        .map(|e| e.location.value().map(|p| p.longitude))
        .collect();
    let location_placeholder: Vec<bool> = events.iter().map(|e| e.location.is_default()).collect();
    let magnitudes: Vec<Option<f64>> = events.iter().map(|e| e.magnitude.known().copied()).collect();
    let depths: Vec<Option<f64>> = events.iter().map(|e| e.depth_km.known().copied()).collect();
    let station_counts: Vec<u32> = events.iter().map(|e| e.station_count as u32).collect();
    let stations: Vec<String> = events
        .iter()
        .map(|e| {
            e.stations
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(";")
        })
        .collect();

    let df = df!(
        "EventID" => event_ids,
        "Date" => dates,
        "Time" => times,
        "Region" => regions,
        "RegionIsPlaceholder" => region_placeholder,
        "Latitude" => latitudes,
        "Longitude" => longitudes,
        "LocationIsPlaceholder" => location_placeholder,
        "Magnitude" => magnitudes,
        "Depth" => depths,
        "StationCount" => station_counts,
        "Stations" => stations,
    )?;

    Ok(df)
}

/// One row per station summary
///
/// `Duration_*` columns are record lengths in seconds at `sampling_rate_hz`;
/// null where there is no local record.
pub fn stations_frame(rows: &[StationSummary], sampling_rate_hz: f64) -> Result<DataFrame> {
    let event_ids: Vec<String> = rows.iter().map(|r| r.event_id.to_string()).collect();
    let codes: Vec<String> = rows.iter().map(|r| r.station.to_string()).collect();

    let peaks = |direction: Direction| -> Vec<Option<f64>> {
        rows.iter()
            .map(|r| r.peak(direction).measured().map(round_peak))
            .collect()
    };
    let present = |direction: Direction| -> Vec<bool> {
        rows.iter()
            .map(|r| r.peak(direction).is_measured())
            .collect()
    };
    let durations = |direction: Direction| -> Vec<Option<f64>> {
        rows.iter()
            .map(|r| r.peak(direction).duration_secs(sampling_rate_hz))
            .collect()
    };

    let df = df!(
        "EventID" => event_ids,
        "Code" => codes,
        "PGA_NS" => peaks(Direction::North),
        "PGA_EW" => peaks(Direction::East),
        "PGA_UD" => peaks(Direction::Up),
        "HasData_NS" => present(Direction::North),
        "HasData_EW" => present(Direction::East),
        "HasData_UD" => present(Direction::Up),
        "Duration_NS" => durations(Direction::North),
        "Duration_EW" => durations(Direction::East),
        "Duration_UD" => durations(Direction::Up),
    )?;

    Ok(df)
}

/// One row per failed record
pub fn failures_frame(failures: &[RecordFailure]) -> Result<DataFrame> {
    let df = df!(
        "EventID" => failures.iter().map(|f| f.event_id.to_string()).collect::<Vec<_>>(),
        "Code" => failures.iter().map(|f| f.station.to_string()).collect::<Vec<_>>(),
        "Direction" => failures.iter().map(|f| f.direction.to_string()).collect::<Vec<_>>(),
        "Path" => failures
            .iter()
            .map(|f| f.path.as_ref().map(|p| p.display().to_string()))
            .collect::<Vec<_>>(),
        "Kind" => failures.iter().map(|f| f.kind.as_str()).collect::<Vec<_>>(),
        "Message" => failures.iter().map(|f| f.message.clone()).collect::<Vec<_>>(),
    )?;

    Ok(df)
}

/// Write a frame as CSV or Parquet, chosen by the path's extension
pub fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !matches!(ext.as_str(), "csv" | "parquet" | "pq") {
        return Err(AfadError::Configuration {
            message: format!(
                "unsupported report format for {} (expected .csv or .parquet)",
                path.display()
            ),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;

    if ext == "csv" {
        CsvWriter::new(file).include_header(true).finish(df)?;
    } else {
        ParquetWriter::new(file).finish(df)?;
    }

    info!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}
