//! In-memory grids, for tests and for callers that already hold decoded data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{GridFile, GridReader};
use crate::error::{GridIndexError, Result};

/// A fully decoded grid.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryGrid {
    year: i32,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    values: Vec<f64>,
}

impl MemoryGrid {
    /// `values` must be row-major and `latitudes.len() * longitudes.len()` long.
    pub fn new(
        year: i32,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        values: Vec<f64>,
    ) -> Result<Self> {
        let expected = latitudes.len() * longitudes.len();
        if values.len() != expected {
            return Err(GridIndexError::read_failed(format!(
                "grid has {} values, expected {} ({} x {})",
                values.len(),
                expected,
                latitudes.len(),
                longitudes.len()
            )));
        }

        Ok(Self {
            year,
            latitudes,
            longitudes,
            values,
        })
    }
}

impl GridFile for MemoryGrid {
    fn year(&self) -> i32 {
        self.year
    }

    fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    fn read_rows(&self, row_start: usize, row_count: usize) -> Result<Vec<f64>> {
        let n_lon = self.longitudes.len();
        let row_end = row_start + row_count;
        if row_end > self.latitudes.len() {
            return Err(GridIndexError::read_failed(format!(
                "rows {}..{} out of range for {} rows",
                row_start,
                row_end,
                self.latitudes.len()
            )));
        }
        Ok(self.values[row_start * n_lon..row_end * n_lon].to_vec())
    }
}

/// Grid reader backed by a map of path to [`MemoryGrid`].
#[derive(Debug, Default)]
pub struct MemoryGridReader {
    grids: HashMap<PathBuf, MemoryGrid>,
    order: Vec<PathBuf>,
    opens: AtomicUsize,
}

impl MemoryGridReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a grid under `path`, replacing any previous one.
    pub fn insert(&mut self, path: impl Into<PathBuf>, grid: MemoryGrid) {
        let path = path.into();
        if self.grids.insert(path.clone(), grid).is_none() {
            self.order.push(path);
        }
    }

    /// Registered paths in insertion order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.order.clone()
    }

    /// Number of successful `open` calls so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Relaxed)
    }
}

impl GridReader for MemoryGridReader {
    fn open(&self, path: &Path) -> Result<Box<dyn GridFile + '_>> {
        let grid = self
            .grids
            .get(path)
            .ok_or_else(|| GridIndexError::open_failed(path.display().to_string(), "not found"))?;

        self.opens.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(grid))
    }
}

impl GridFile for &MemoryGrid {
    fn year(&self) -> i32 {
        (**self).year()
    }

    fn latitudes(&self) -> &[f64] {
        (**self).latitudes()
    }

    fn longitudes(&self) -> &[f64] {
        (**self).longitudes()
    }

    fn read_rows(&self, row_start: usize, row_count: usize) -> Result<Vec<f64>> {
        (**self).read_rows(row_start, row_count)
    }
}
