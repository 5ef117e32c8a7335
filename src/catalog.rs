//! Record catalog discovery
//!
//! Walks the configured data roots and maps every accelerograph record file to
//! its event, station and direction using the filename convention:
//!
//! ```text
//! <root>/
//!   20230206_043717_4614_N.asc     event 20230206_043717, station 4614, North
//!   20230206_043717_4614_E.asc
//!   20230206_043717/
//!     4615_U.asc                   event from parent directory, station 4615, Up
//! ```
//!
//! Station codes never contain the segment separator; event identifiers may.

use crate::constants::RECORD_EXTENSION;
use crate::error::{AfadError, Result};
use crate::models::{Direction, EventId, StationCode};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Files recorded by one station for one event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationFiles {
    files: BTreeMap<Direction, PathBuf>,
}

impl StationFiles {
    pub fn get(&self, direction: Direction) -> Option<&Path> {
        self.files.get(&direction).map(PathBuf::as_path)
    }

    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.files.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Discovered mapping from events and stations to record files
///
/// Iteration order is sorted by event id, then station code, so it is stable
/// across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    events: BTreeMap<EventId, BTreeMap<StationCode, StationFiles>>,
}

impl Catalog {
    pub fn event_ids(&self) -> impl Iterator<Item = &EventId> {
        self.events.keys()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains_event(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    /// Station codes recorded for an event; empty for unknown events
    pub fn stations(&self, event: &str) -> Vec<StationCode> {
        self.events
            .get(event)
            .map(|stations| stations.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn station_files(&self, event: &str, station: &str) -> Option<&StationFiles> {
        self.events.get(event)?.get(station)
    }

    /// Every file for a direction within an event, in station order
    pub fn files_for_direction(&self, event: &str, direction: Direction) -> Vec<&Path> {
        self.events
            .get(event)
            .map(|stations| {
                stations
                    .values()
                    .filter_map(|files| files.get(direction))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The file for one event, station and direction, if any
    pub fn file_for(&self, event: &str, station: &str, direction: Direction) -> Option<&Path> {
        self.station_files(event, station)?.get(direction)
    }

    /// Total number of record files
    pub fn file_count(&self) -> usize {
        self.events
            .values()
            .flat_map(|stations| stations.values())
            .map(StationFiles::len)
            .sum()
    }

    /// Insert a file; returns false if the key was already taken
    fn insert(
        &mut self,
        event: EventId,
        station: StationCode,
        direction: Direction,
        path: PathBuf,
    ) -> bool {
        let files = &mut self
            .events
            .entry(event)
            .or_default()
            .entry(station)
            .or_default()
            .files;

        if files.contains_key(&direction) {
            return false;
        }
        files.insert(direction, path);
        true
    }
}

/// Event, station and direction extracted from a record path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub event: EventId,
    pub station: StationCode,
    pub direction: Direction,
}

/// Scans data roots for record files
#[derive(Debug, Clone)]
pub struct PathCatalog {
    roots: Vec<PathBuf>,
    extension: String,
    filename_pattern: Regex,
}

/// Filename pattern for records with the given extension
///
/// Direction suffixes come from [`Direction::suffix`].
fn filename_pattern(extension: &str) -> String {
    let suffixes = Direction::ALL
        .iter()
        .map(|direction| regex::escape(&direction.suffix(extension)))
        .collect::<Vec<_>>()
        .join("|");
    format!(r"^(?:(?P<event>.+)_)?(?P<station>[^_]+)(?P<suffix>{suffixes})$")
}

static DEFAULT_FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&filename_pattern(RECORD_EXTENSION))
        .unwrap_or_else(|e| panic!("invalid record filename pattern: {e}"))
});

impl PathCatalog {
    /// Create a catalog over the given roots using the default `.asc` extension
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            extension: RECORD_EXTENSION.to_string(),
            filename_pattern: DEFAULT_FILENAME_PATTERN.clone(),
        }
    }

    /// Create a catalog recognizing a custom record extension
    pub fn with_extension(roots: Vec<PathBuf>, extension: &str) -> Result<Self> {
        if extension == RECORD_EXTENSION {
            return Ok(Self::new(roots));
        }

        let filename_pattern =
            Regex::new(&filename_pattern(extension)).map_err(|e| AfadError::Configuration {
                message: format!("invalid record extension '{}': {}", extension, e),
            })?;

        Ok(Self {
            roots,
            extension: extension.to_string(),
            filename_pattern,
        })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Build a complete catalog from the filesystem
    ///
    /// Never fails: missing roots, unreadable entries and non-matching files
    /// are skipped.
    pub fn discover(&self) -> Catalog {
        let mut catalog = Catalog::default();
        let mut skipped = 0usize;

        for root in &self.roots {
            if !root.is_dir() {
                debug!("Skipping missing data root: {}", root.display());
                continue;
            }

            debug!("Searching for record files in: {}", root.display());

            let walker = WalkDir::new(root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                        continue;
                    }
                };

                if !entry.file_type().is_file() {
                    continue;
                }

                let path = entry.path();
                let Some(key) = self.classify(path) else {
                    skipped += 1;
                    continue;
                };

                let RecordKey {
                    event,
                    station,
                    direction,
                } = key;
                if !catalog.insert(
                    event.clone(),
                    station.clone(),
                    direction,
                    path.to_path_buf(),
                ) {
                    warn!(
                        "Duplicate record for event {} station {} direction {}: ignoring {}",
                        event,
                        station,
                        direction,
                        path.display()
                    );
                }
            }
        }

        debug!(
            "Found {} record files for {} events ({} other files skipped)",
            catalog.file_count(),
            catalog.event_count(),
            skipped
        );

        catalog
    }

    /// Extract the record key from a path, if it follows the naming convention
    ///
    /// A file without an event prefix takes its event from the enclosing
    /// directory, unless that directory is itself a data root.
    pub fn classify(&self, path: &Path) -> Option<RecordKey> {
        let file_name = path.file_name()?.to_str()?;
        let captures = self.filename_pattern.captures(file_name)?;

        let suffix = captures.name("suffix")?.as_str();
        let direction = Direction::ALL
            .into_iter()
            .find(|direction| direction.suffix(&self.extension) == suffix)?;
        let station = StationCode::new(captures.name("station")?.as_str());

        let event = match captures.name("event") {
            Some(event) => EventId::new(event.as_str()),
            None => {
                let parent = path.parent()?;
                if self.roots.iter().any(|root| root == parent) {
                    debug!(
                        "Skipping {}: no event prefix and no event directory",
                        path.display()
                    );
                    return None;
                }
                EventId::new(parent.file_name()?.to_str()?)
            }
        };

        Some(RecordKey {
            event,
            station,
            direction,
        })
    }
}
