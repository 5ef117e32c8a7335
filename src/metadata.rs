//! Event metadata inference.
//!
//! Dates and times come from the event identifier; station lists come from
//! the catalog. Geography cannot be derived from the record files, so it is
//! reported as placeholder or unknown.

use crate::catalog::Catalog;
use crate::constants::{EVENT_DATE_LEN, EVENT_TIME_LEN, SEGMENT_SEPARATOR, placeholders};
use crate::models::{EventId, EventMetadata, GeoPoint, Inferred};
use chrono::{NaiveDate, NaiveTime};

/// Derive the date and time encoded in an event identifier
///
/// `YYYYMMDD_HHMMSS` yields both; an identifier without a separator yields
/// only the date. Anything malformed, including extra segments or digits
/// after the time, yields unknown for both.
pub fn parse_event_id(id: &str) -> (Inferred<NaiveDate>, Inferred<NaiveTime>) {
    let parsed = match id.split_once(SEGMENT_SEPARATOR) {
        Some((date_part, time_part)) => parse_date(date_part)
            .zip(exact_time(time_part))
            .map(|(date, time)| (Inferred::Known(date), Inferred::Known(time))),
        None => parse_date(id).map(|date| (Inferred::Known(date), Inferred::Unknown)),
    };

    parsed.unwrap_or((Inferred::Unknown, Inferred::Unknown))
}

fn parse_date(segment: &str) -> Option<NaiveDate> {
    let digits = leading_digits(segment, EVENT_DATE_LEN)?;
    NaiveDate::from_ymd_opt(
        digits[0..4].parse().ok()?,
        digits[4..6].parse().ok()?,
        digits[6..8].parse().ok()?,
    )
}

fn parse_time(segment: &str) -> Option<NaiveTime> {
    let digits = leading_digits(segment, EVENT_TIME_LEN)?;
    NaiveTime::from_hms_opt(
        digits[0..2].parse().ok()?,
        digits[2..4].parse().ok()?,
        digits[4..6].parse().ok()?,
    )
}

fn exact_time(segment: &str) -> Option<NaiveTime> {
    if segment.len() != EVENT_TIME_LEN {
        return None;
    }
    parse_time(segment)
}

/// The first `len` characters, if they exist and are all ASCII digits
fn leading_digits(segment: &str, len: usize) -> Option<&str> {
    let digits = segment.get(..len)?;
    digits
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then_some(digits)
}

/// Metadata for one event; total over arbitrary identifiers
pub fn metadata_for(catalog: &Catalog, event_id: &EventId) -> EventMetadata {
    let (date, time) = parse_event_id(event_id.as_str());
    let stations = catalog.stations(event_id.as_str());

    EventMetadata {
        event_id: event_id.clone(),
        date,
        time,
        station_count: stations.len(),
        stations,
        region: Inferred::Default(placeholders::REGION.to_string()),
        location: Inferred::Default(GeoPoint {
            latitude: placeholders::LATITUDE,
            longitude: placeholders::LONGITUDE,
        }),
        magnitude: Inferred::Unknown,
        depth_km: Inferred::Unknown,
    }
}

/// Metadata for every event in the catalog, in catalog order
pub fn all_event_metadata(catalog: &Catalog) -> Vec<EventMetadata> {
    catalog
        .event_ids()
        .map(|event_id| metadata_for(catalog, event_id))
        .collect()
}
