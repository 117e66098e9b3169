//! NetCDF-backed grid reader.

use std::path::Path;

use netcdf_parser::{GridLayout, NetCdfGrid};

use super::{GridFile, GridReader};
use crate::error::{GridIndexError, Result};

/// Opens PM2.5 NetCDF files with the configured variable names.
#[derive(Debug, Clone, Default)]
pub struct NetCdfGridReader {
    layout: GridLayout,
}

impl NetCdfGridReader {
    pub fn new(layout: GridLayout) -> Self {
        Self { layout }
    }
}

impl GridReader for NetCdfGridReader {
    fn open(&self, path: &Path) -> Result<Box<dyn GridFile + '_>> {
        let grid = NetCdfGrid::open(path, &self.layout)
            .map_err(|e| GridIndexError::open_failed(path.display().to_string(), e.to_string()))?;
        Ok(Box::new(grid))
    }
}

impl GridFile for NetCdfGrid {
    fn year(&self) -> i32 {
        NetCdfGrid::year(self)
    }

    fn latitudes(&self) -> &[f64] {
        NetCdfGrid::latitudes(self)
    }

    fn longitudes(&self) -> &[f64] {
        NetCdfGrid::longitudes(self)
    }

    fn read_rows(&self, row_start: usize, row_count: usize) -> Result<Vec<f64>> {
        Ok(NetCdfGrid::read_rows(self, row_start, row_count)?)
    }
}
