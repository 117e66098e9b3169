//! Grid file access.
//!
//! A [`GridReader`] opens one grid file at a time; the returned [`GridFile`]
//! handle is dropped once its batches are exhausted. [`row_batches`] turns a
//! handle into a lazy sequence of point-record batches:
//!
//! ```text
//! GridFile (n_lat x n_lon)
//!      │
//!      ├─► read_rows(r, k)  one latitude slab per batch
//!      │
//!      ├─► flatten          latitude-major, longitude-minor
//!      │
//!      └─► drop NaN cells   NaN never leaves the reader
//! ```

mod memory;
#[cfg(feature = "native")]
mod netcdf;

pub use memory::{MemoryGrid, MemoryGridReader};
#[cfg(feature = "native")]
pub use netcdf::NetCdfGridReader;

use std::path::Path;

use crate::error::Result;
use crate::types::PointRecord;

/// One open grid file.
pub trait GridFile {
    /// Year of every cell in the file.
    fn year(&self) -> i32;

    fn latitudes(&self) -> &[f64];

    fn longitudes(&self) -> &[f64];

    /// Values of `row_count` whole latitude rows starting at `row_start`,
    /// row-major. Masked cells are NaN.
    fn read_rows(&self, row_start: usize, row_count: usize) -> Result<Vec<f64>>;

    /// Total number of cells, NaN cells included.
    fn point_count(&self) -> usize {
        self.latitudes().len() * self.longitudes().len()
    }
}

/// Opens grid files by path.
pub trait GridReader: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn GridFile + '_>>;
}

/// Lazy batches of non-NaN point records.
///
/// Each call starts again from the first row, so the same file can be
/// streamed any number of times.
pub fn row_batches(file: &dyn GridFile, batch_size: usize) -> RowBatches<'_> {
    let n_lon = file.longitudes().len().max(1);
    RowBatches {
        file,
        rows_per_batch: (batch_size / n_lon).max(1),
        next_row: 0,
    }
}

/// Iterator returned by [`row_batches`].
pub struct RowBatches<'a> {
    file: &'a dyn GridFile,
    rows_per_batch: usize,
    next_row: usize,
}

impl RowBatches<'_> {
    fn read_batch(&self, row_start: usize, row_count: usize) -> Result<Vec<PointRecord>> {
        let year = self.file.year();
        let latitudes = &self.file.latitudes()[row_start..row_start + row_count];
        let longitudes = self.file.longitudes();
        let values = self.file.read_rows(row_start, row_count)?;

        let mut batch = Vec::with_capacity(values.len());
        for (row, &latitude) in latitudes.iter().enumerate() {
            let row_values = &values[row * longitudes.len()..(row + 1) * longitudes.len()];
            for (&longitude, &value) in longitudes.iter().zip(row_values) {
                if !value.is_nan() {
                    batch.push(PointRecord::new(year, latitude, longitude, value));
                }
            }
        }
        Ok(batch)
    }
}

impl Iterator for RowBatches<'_> {
    type Item = Result<Vec<PointRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let n_rows = self.file.latitudes().len();
        if self.next_row >= n_rows {
            return None;
        }

        let row_start = self.next_row;
        let row_count = self.rows_per_batch.min(n_rows - row_start);
        self.next_row += row_count;

        Some(self.read_batch(row_start, row_count))
    }
}
