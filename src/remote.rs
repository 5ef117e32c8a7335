//! Remote analysis with local fallback.
//!
//! Advanced metrics come from an external analysis service that this crate
//! does not implement. Callers that have a client for it go through
//! [`resolve_peak`], which tries the service first and computes locally on
//! any failure, reporting which path produced the value.

use crate::cache::RecordStore;
use crate::error::Result;
use crate::metrics::MetricEngine;
use crate::models::{Direction, EventId, PeakReading, StationCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Client for the external analysis service
pub trait RemoteAnalysis {
    /// Peak ground acceleration computed by the service
    fn peak_amplitude(
        &self,
        event: &EventId,
        station: &StationCode,
        direction: Direction,
    ) -> Result<f64>;
}

/// Which path produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricSource {
    Remote,
    Local,
}

/// A value and the path that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: MetricSource,
}

/// Peak amplitude from the remote service, falling back to local computation
pub fn resolve_peak<S: RecordStore + ?Sized>(
    remote: Option<&dyn RemoteAnalysis>,
    engine: &MetricEngine<'_, S>,
    event: &EventId,
    station: &StationCode,
    direction: Direction,
) -> Resolved<PeakReading> {
    if let Some(remote) = remote {
        match remote.peak_amplitude(event, station, direction) {
            Ok(pga) if pga.is_finite() => {
                debug!("Remote peak for {}/{}/{}: {}", event, station, direction, pga);
                return Resolved {
                    value: PeakReading::Reported { pga },
                    source: MetricSource::Remote,
                };
            }
            Ok(pga) => warn!(
                "Remote peak for {}/{}/{} is not finite ({}), computing locally",
                event, station, direction, pga
            ),
            Err(e) => warn!(
                "Remote analysis failed for {}/{}/{}, computing locally: {}",
                event, station, direction, e
            ),
        }
    }

    let (value, _) = engine.direction_peak(event, station, direction);
    Resolved {
        value,
        source: MetricSource::Local,
    }
}
