//! The grid data service: one owned object per process.
//!
//! Built once at startup and shared behind an `Arc`. The file index and year
//! statistics are immutable after [`GridDataService::initialize`]; only the
//! overlay changes, under a read-write lock.

use std::path::PathBuf;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::aggregator::WindowedAggregator;
use crate::config::IndexConfig;
use crate::error::{GridIndexError, Result};
use crate::materializer::RangeMaterializer;
use crate::overlay::{OverlaySlot, OverlayStore};
use crate::reader::GridReader;
use crate::types::{FileGroup, FileIndexEntry, PointRecord, RecordFilter, StatsReport};

/// Windowed view over a fixed set of grid files plus an in-memory edit overlay.
pub struct GridDataService {
    reader: Arc<dyn GridReader>,
    config: IndexConfig,
    aggregator: WindowedAggregator,
    overlay: RwLock<OverlayStore>,
}

impl GridDataService {
    /// Validate `config` and scan every file in `paths` once.
    ///
    /// Blocking; fails if any file cannot be indexed.
    pub fn initialize(
        reader: Arc<dyn GridReader>,
        paths: &[PathBuf],
        config: IndexConfig,
    ) -> Result<Self> {
        config.validate().map_err(GridIndexError::ConfigError)?;

        let aggregator = WindowedAggregator::initialize(reader.as_ref(), paths, config.batch_size)?;
        let overlay = OverlayStore::new(aggregator.total_points());

        info!(
            files = aggregator.files().len(),
            total_points = aggregator.total_points(),
            batch_size = config.batch_size,
            location_tolerance = config.location_tolerance,
            "Grid data service ready"
        );

        Ok(Self {
            reader,
            config,
            aggregator,
            overlay: RwLock::new(overlay),
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The file index table, in global order.
    pub fn files(&self) -> &[FileIndexEntry] {
        self.aggregator.files()
    }

    pub fn years(&self) -> Vec<i32> {
        self.aggregator.years()
    }

    /// File-backed points plus records created through the overlay.
    pub fn total_points(&self) -> Result<usize> {
        Ok(self.read_overlay()?.total_points())
    }

    pub fn get_stats(&self, year: Option<i32>) -> StatsReport {
        self.aggregator.get_stats(year)
    }

    /// See [`RangeMaterializer::get_range`]. Overlay edits are not visible here.
    pub fn get_range(
        &self,
        start: usize,
        end: usize,
        filter: &RecordFilter,
    ) -> Result<Vec<FileGroup>> {
        self.materializer().get_range(start, end, filter)
    }

    /// See [`RangeMaterializer::count`].
    pub fn count(&self, filter: &RecordFilter) -> Result<usize> {
        let total = self.total_points()?;
        self.materializer().count(filter, total)
    }

    /// Overlay first, then the file-backed record at global index `id`.
    pub fn get_entry_by_id(&self, id: usize) -> Result<Option<PointRecord>> {
        if let Some(slot) = self.read_overlay()?.lookup(id) {
            debug!(id = id, "Resolved id from overlay");
            return Ok(match slot {
                OverlaySlot::Record(record) => Some(record),
                OverlaySlot::Tombstone => None,
            });
        }

        let Some(end) = id.checked_add(1) else {
            return Ok(None);
        };
        let groups = self.get_range(id, end, &RecordFilter::new())?;
        Ok(groups
            .into_iter()
            .flat_map(|group| group.records)
            .next())
    }

    /// Store `record` under a fresh id past every file-backed index.
    pub fn create_entry(&self, record: PointRecord) -> Result<usize> {
        Ok(self.write_overlay()?.create(record))
    }

    /// Overwrite the record at `id`. Returns `false` if `id` resolves to nothing.
    pub fn update_entry(&self, id: usize, record: PointRecord) -> Result<bool> {
        if self.get_entry_by_id(id)?.is_none() {
            return Ok(false);
        }
        self.write_overlay()?.update(id, record);
        debug!(id = id, "Updated overlay record");
        Ok(true)
    }

    /// Tombstone the record at `id`. Returns `false` if `id` resolves to nothing.
    pub fn delete_entry(&self, id: usize) -> Result<bool> {
        if self.get_entry_by_id(id)?.is_none() {
            return Ok(false);
        }
        self.write_overlay()?.delete(id);
        debug!(id = id, "Deleted record");
        Ok(true)
    }

    fn materializer(&self) -> RangeMaterializer<'_> {
        RangeMaterializer::new(self.reader.as_ref(), &self.aggregator, &self.config)
    }

    fn read_overlay(&self) -> Result<RwLockReadGuard<'_, OverlayStore>> {
        self.overlay.read().map_err(|_| GridIndexError::LockPoisoned)
    }

    fn write_overlay(&self) -> Result<RwLockWriteGuard<'_, OverlayStore>> {
        self.overlay.write().map_err(|_| GridIndexError::LockPoisoned)
    }
}
