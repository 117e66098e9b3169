//! Startup scan: the global file index table and per-year statistics.
//!
//! Every grid file is streamed exactly once, in the order given. Each file
//! gets the next contiguous slice `[global_start, global_end)` of the global
//! point ordering, sized by its cell count (NaN cells included), and every
//! batch is folded into the per-year running statistics (NaN cells excluded).
//!
//! Nothing here is recomputed after startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;
use crate::reader::{row_batches, GridReader};
use crate::types::{FileIndexEntry, PointRecord, StatsReport, YearStats};

/// Owner of the file index table and the year statistics.
#[derive(Debug, Clone, Default)]
pub struct WindowedAggregator {
    files: Vec<FileIndexEntry>,
    year_stats: BTreeMap<i32, YearStats>,
    total_points: usize,
}

impl WindowedAggregator {
    /// Scan every file once, in order.
    ///
    /// Any file that fails to open or read aborts the whole scan: a partial
    /// index would shift the global position of every later file.
    pub fn initialize(
        reader: &dyn GridReader,
        paths: &[PathBuf],
        batch_size: usize,
    ) -> Result<Self> {
        let mut aggregator = Self::default();

        for path in paths {
            aggregator.index_file(reader, path, batch_size)?;
        }

        info!(
            files = aggregator.files.len(),
            total_points = aggregator.total_points,
            years = aggregator.year_stats.len(),
            "Grid index initialized"
        );

        Ok(aggregator)
    }

    fn index_file(&mut self, reader: &dyn GridReader, path: &Path, batch_size: usize) -> Result<()> {
        let grid = reader.open(path)?;
        let point_count = grid.point_count();

        let entry = FileIndexEntry {
            file_id: file_id(path),
            path: path.to_path_buf(),
            point_count,
            global_start: self.total_points,
            global_end: self.total_points + point_count,
        };

        for batch in row_batches(grid.as_ref(), batch_size) {
            self.fold_batch(&batch?);
        }

        info!(
            file = %entry.file_id,
            year = grid.year(),
            point_count = point_count,
            global_start = entry.global_start,
            global_end = entry.global_end,
            "Indexed grid file"
        );

        self.total_points += point_count;
        self.files.push(entry);
        Ok(())
    }

    /// Group the batch by year and merge each group's summary.
    fn fold_batch(&mut self, batch: &[PointRecord]) {
        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for record in batch {
            by_year.entry(record.year).or_default().push(record.value);
        }

        for (year, values) in by_year {
            let summary = YearStats::from_values(values);
            debug!(year = year, count = summary.count, "Folding batch into year stats");
            self.year_stats.entry(year).or_default().merge(&summary);
        }
    }

    pub fn files(&self) -> &[FileIndexEntry] {
        &self.files
    }

    /// Total cell count across all indexed files.
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    pub fn year_stats(&self, year: i32) -> Option<&YearStats> {
        self.year_stats.get(&year)
    }

    /// Years with at least one non-NaN cell, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.year_stats.keys().copied().collect()
    }

    /// Statistics for one year, or folded across all years.
    ///
    /// An unknown year yields [`StatsReport::empty`], not an error.
    pub fn get_stats(&self, year: Option<i32>) -> StatsReport {
        match year {
            Some(year) => match self.year_stats.get(&year) {
                Some(stats) => StatsReport {
                    count: stats.count,
                    average: stats.average(),
                    min: stats.min,
                    max: stats.max,
                    years_available: vec![year],
                },
                None => StatsReport::empty(),
            },
            None => {
                let mut total = YearStats::default();
                for stats in self.year_stats.values() {
                    total.merge(stats);
                }

                if total.count == 0 {
                    return StatsReport::empty();
                }

                StatsReport {
                    count: total.count,
                    average: total.average(),
                    min: total.min,
                    max: total.max,
                    years_available: self.years(),
                }
            }
        }
    }
}

/// Public id of a grid file: its file name.
fn file_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
