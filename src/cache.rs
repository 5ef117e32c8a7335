//! Process-lifetime memoization of discovery and parse results.
//!
//! The corpus is treated as immutable for the duration of a run, so entries
//! are never invalidated. A miss always falls through to a full rediscovery
//! or reparse; failed parses are not cached.
//!
//! [`RecordCache`] is single-threaded (it is `!Sync`). [`SharedRecordCache`]
//! can be shared across worker threads: lookups take a read lock, and on a
//! miss the record is parsed outside any lock and inserted with a
//! first-writer-wins policy, so every caller sees the same entry for a key.

use crate::catalog::{Catalog, PathCatalog};
use crate::config::AfadConfig;
use crate::error::Result;
use crate::parser::{ParsedRecord, RecordParser};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

/// Source of catalogs and parsed records
pub trait RecordStore {
    /// The current catalog
    fn catalog(&self) -> Arc<Catalog>;

    /// The parsed record at `path`
    fn record(&self, path: &Path) -> Result<Arc<ParsedRecord>>;

    /// Cache counters
    fn stats(&self) -> CacheStats;
}

/// Hit and miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub catalog_builds: usize,
    pub record_hits: usize,
    pub record_misses: usize,
}

/// Single-threaded cache
#[derive(Debug)]
pub struct RecordCache {
    path_catalog: PathCatalog,
    parser: RecordParser,
    catalog: RefCell<Option<Arc<Catalog>>>,
    records: RefCell<HashMap<PathBuf, Arc<ParsedRecord>>>,
    stats: Cell<CacheStats>,
}

impl RecordCache {
    pub fn new(path_catalog: PathCatalog, parser: RecordParser) -> Self {
        Self {
            path_catalog,
            parser,
            catalog: RefCell::new(None),
            records: RefCell::new(HashMap::new()),
            stats: Cell::new(CacheStats::default()),
        }
    }

    pub fn from_config(config: &AfadConfig) -> Result<Self> {
        let (path_catalog, parser) = components(config)?;
        Ok(Self::new(path_catalog, parser))
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }
}

impl RecordStore for RecordCache {
    fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self.catalog.borrow().as_ref() {
            return Arc::clone(catalog);
        }

        let catalog = Arc::new(self.path_catalog.discover());
        self.bump(|s| s.catalog_builds += 1);
        *self.catalog.borrow_mut() = Some(Arc::clone(&catalog));
        catalog
    }

    fn record(&self, path: &Path) -> Result<Arc<ParsedRecord>> {
        if let Some(record) = self.records.borrow().get(path) {
            self.bump(|s| s.record_hits += 1);
            return Ok(Arc::clone(record));
        }

        self.bump(|s| s.record_misses += 1);
        let record = Arc::new(self.parser.parse(path)?);
        self.records
            .borrow_mut()
            .insert(path.to_path_buf(), Arc::clone(&record));
        Ok(record)
    }

    fn stats(&self) -> CacheStats {
        self.stats.get()
    }
}

/// Cache that can be shared between worker threads
#[derive(Debug)]
pub struct SharedRecordCache {
    path_catalog: PathCatalog,
    parser: RecordParser,
    catalog: RwLock<Option<Arc<Catalog>>>,
    records: RwLock<HashMap<PathBuf, Arc<ParsedRecord>>>,
    stats: Mutex<CacheStats>,
}

impl SharedRecordCache {
    pub fn new(path_catalog: PathCatalog, parser: RecordParser) -> Self {
        Self {
            path_catalog,
            parser,
            catalog: RwLock::new(None),
            records: RwLock::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    pub fn from_config(config: &AfadConfig) -> Result<Self> {
        let (path_catalog, parser) = components(config)?;
        Ok(Self::new(path_catalog, parser))
    }

    pub fn parser(&self) -> &RecordParser {
        &self.parser
    }

    fn bump(&self, update: impl FnOnce(&mut CacheStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        update(&mut stats);
    }
}

impl RecordStore for SharedRecordCache {
    fn catalog(&self) -> Arc<Catalog> {
        if let Some(catalog) = self
            .catalog
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(catalog);
        }

        // Discovery runs under the write lock so concurrent misses build once
        let mut slot = self.catalog.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(catalog) = slot.as_ref() {
            return Arc::clone(catalog);
        }

        let catalog = Arc::new(self.path_catalog.discover());
        self.bump(|s| s.catalog_builds += 1);
        *slot = Some(Arc::clone(&catalog));
        catalog
    }

    fn record(&self, path: &Path) -> Result<Arc<ParsedRecord>> {
        if let Some(record) = self
            .records
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
        {
            self.bump(|s| s.record_hits += 1);
            return Ok(Arc::clone(record));
        }

        self.bump(|s| s.record_misses += 1);
        let parsed = Arc::new(self.parser.parse(path)?);

        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        let record = match records.entry(path.to_path_buf()) {
            Entry::Occupied(existing) => {
                debug!("Record already cached by another worker: {}", path.display());
                Arc::clone(existing.get())
            }
            Entry::Vacant(slot) => Arc::clone(slot.insert(parsed)),
        };
        Ok(record)
    }

    fn stats(&self) -> CacheStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn components(config: &AfadConfig) -> Result<(PathCatalog, RecordParser)> {
    config.validate()?;
    let path_catalog =
        PathCatalog::with_extension(config.data_roots.clone(), &config.record_extension)?;
    Ok((path_catalog, RecordParser::new(config.max_samples)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Direction;
    use std::fs;
    use std::thread;
    use tempfile::TempDir;

    fn create_corpus(temp_dir: &TempDir) -> PathBuf {
        let root = temp_dir.path().join("data");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("EVT1_STA1_N.asc"), "0.1\n-0.4\n").unwrap();
        fs::write(root.join("EVT1_STA1_E.asc"), "STATION: STA1\n").unwrap();
        root
    }

    #[test]
    fn test_catalog_is_memoized() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_corpus(&temp_dir);
        let cache = RecordCache::new(PathCatalog::new(vec![root.clone()]), RecordParser::default());

        let first = cache.catalog();
        // New files are not seen until the process restarts
        fs::write(root.join("EVT2_STA1_N.asc"), "0.2\n").unwrap();
        let second = cache.catalog();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.event_count(), 1);
        assert_eq!(cache.stats().catalog_builds, 1);
    }

    #[test]
    fn test_records_are_memoized() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_corpus(&temp_dir);
        let cache = RecordCache::new(PathCatalog::new(vec![root.clone()]), RecordParser::default());
        let path = root.join("EVT1_STA1_N.asc");

        let first = cache.record(&path).unwrap();
        let second = cache.record(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            cache.stats(),
            CacheStats {
                catalog_builds: 0,
                record_hits: 1,
                record_misses: 1,
            }
        );
    }

    #[test]
    fn test_cached_results_match_direct_computation() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_corpus(&temp_dir);
        let path_catalog = PathCatalog::new(vec![root.clone()]);
        let cache = RecordCache::new(path_catalog.clone(), RecordParser::default());

        assert_eq!(*cache.catalog(), path_catalog.discover());

        let path = root.join("EVT1_STA1_N.asc");
        let direct = RecordParser::default().parse(&path).unwrap();
        assert_eq!(*cache.record(&path).unwrap(), direct);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_corpus(&temp_dir);
        let cache = RecordCache::new(PathCatalog::new(vec![root.clone()]), RecordParser::default());
        let path = root.join("EVT1_STA1_E.asc");

        assert!(cache.record(&path).is_err());
        assert!(cache.record(&path).is_err());
        assert_eq!(cache.stats().record_misses, 2);
        assert_eq!(cache.stats().record_hits, 0);
    }

    #[test]
    fn test_shared_cache_across_threads() {
        let temp_dir = TempDir::new().unwrap();
        let root = create_corpus(&temp_dir);
        let cache = Arc::new(SharedRecordCache::new(
            PathCatalog::new(vec![root]),
            RecordParser::default(),
        ));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let catalog = cache.catalog();
                    let path = catalog
                        .file_for("EVT1", "STA1", Direction::North)
                        .unwrap()
                        .to_path_buf();
                    cache.record(&path).unwrap()
                })
            })
            .collect();

        let records: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(cache.stats().catalog_builds, 1);
        for record in &records {
            assert!(Arc::ptr_eq(record, &records[0]));
        }
        let stats = cache.stats();
        assert_eq!(stats.record_hits + stats.record_misses, 4);
    }

    #[test]
    fn test_from_config_validates() {
        let config = AfadConfig::default().with_max_samples(0);
        assert!(RecordCache::from_config(&config).is_err());
        assert!(SharedRecordCache::from_config(&config).is_err());
    }
}
