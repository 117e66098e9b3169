//! Lazy materialization of global index ranges.
//!
//! # Index arithmetic
//!
//! The walk keeps a running `current_index` from the start of the file list:
//!
//! ```text
//! files:   [ A: 0..6 )[ B: 6..10 )[ C: 10..14 )
//!              │           │
//!              │           └─► overlaps [start, end): re-open, stream batches,
//!              │               filter each batch, then slice by current_index
//!              └─► current_index + point_count <= start: skip, no I/O
//! ```
//!
//! Skipped files advance `current_index` by their full cell count. Streamed
//! batches advance it by the number of rows that survive NaN removal and
//! filtering, so with filters the indices count matching rows only
//! (filter-then-offset). Files are never entered mid-way: a file that
//! overlaps the range is streamed from its first row.

use tracing::{debug, warn};

use crate::aggregator::WindowedAggregator;
use crate::config::IndexConfig;
use crate::error::{GridIndexError, Result};
use crate::reader::{row_batches, GridReader};
use crate::types::{FileGroup, PointRecord, RecordFilter};

/// Streams the records of a global index range out of the grid files.
pub struct RangeMaterializer<'a> {
    reader: &'a dyn GridReader,
    aggregator: &'a WindowedAggregator,
    batch_size: usize,
    tolerance: f64,
}

impl<'a> RangeMaterializer<'a> {
    pub fn new(
        reader: &'a dyn GridReader,
        aggregator: &'a WindowedAggregator,
        config: &IndexConfig,
    ) -> Self {
        Self {
            reader,
            aggregator,
            batch_size: config.batch_size,
            tolerance: config.location_tolerance,
        }
    }

    /// Records with global index in `[start, end)` that pass `filter`,
    /// grouped by file in file order.
    ///
    /// Fewer than `end - start` records come back when the files run out or
    /// filters reject candidates; an empty result is not an error.
    pub fn get_range(
        &self,
        start: usize,
        end: usize,
        filter: &RecordFilter,
    ) -> Result<Vec<FileGroup>> {
        if start >= end {
            return Err(GridIndexError::InvalidRange { start, end });
        }

        let wanted = end - start;
        let mut returned = 0usize;
        let mut current_index = 0usize;
        let mut groups = Vec::new();

        for entry in self.aggregator.files() {
            if current_index + entry.point_count <= start {
                current_index += entry.point_count;
                continue;
            }

            debug!(
                file = %entry.file_id,
                current_index = current_index,
                start = start,
                end = end,
                "Streaming grid file for range"
            );

            let grid = self.reader.open(&entry.path)?;
            let mut records: Vec<PointRecord> = Vec::new();

            for batch in row_batches(grid.as_ref(), self.batch_size) {
                let mut batch = batch?;
                filter.apply(&mut batch, self.tolerance);
                let len = batch.len();

                if current_index + len > start {
                    let lo = start.saturating_sub(current_index);
                    let hi = len.min(end.saturating_sub(current_index));
                    if lo < hi {
                        records.extend_from_slice(&batch[lo..hi]);
                        returned += hi - lo;
                    }
                }
                current_index += len;

                if returned >= wanted || current_index >= end {
                    break;
                }
            }

            push_group(&mut groups, &entry.file_id, records);

            if returned >= wanted || current_index >= end {
                break;
            }
        }

        Ok(groups)
    }

    /// Number of records matching `filter`.
    ///
    /// - no filter: `total_points` (which includes overlay-created ids)
    /// - year only: the precomputed year count, O(1)
    /// - any location filter: a full re-scan of every file
    pub fn count(&self, filter: &RecordFilter, total_points: usize) -> Result<usize> {
        if filter.is_empty() {
            return Ok(total_points);
        }

        if !filter.has_location() {
            let count = filter
                .year
                .and_then(|year| self.aggregator.year_stats(year))
                .map(|stats| stats.count)
                .unwrap_or(0);
            return Ok(count);
        }

        self.count_matching(filter)
    }

    /// Count matches by streaming every file.
    ///
    /// Cost grows with the whole corpus on every call; there is no spatial
    /// index behind location filters.
    pub fn count_matching(&self, filter: &RecordFilter) -> Result<usize> {
        warn!(
            files = self.aggregator.files().len(),
            year = ?filter.year,
            lat = ?filter.lat,
            lon = ?filter.lon,
            "Location-filtered count requires a full re-scan"
        );

        let mut total = 0usize;
        for entry in self.aggregator.files() {
            let grid = self.reader.open(&entry.path)?;
            for batch in row_batches(grid.as_ref(), self.batch_size) {
                total += batch?
                    .iter()
                    .filter(|record| filter.matches(record, self.tolerance))
                    .count();
            }
        }
        Ok(total)
    }
}

fn push_group(groups: &mut Vec<FileGroup>, file_id: &str, records: Vec<PointRecord>) {
    if !records.is_empty() {
        groups.push(FileGroup {
            file_id: file_id.to_string(),
            records,
        });
    }
}
