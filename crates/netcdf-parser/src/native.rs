//! Native NetCDF reading using the netcdf library.
//!
//! A [`NetCdfGrid`] keeps the file handle open and reads the value variable
//! one latitude slab at a time, so a caller streaming batches never holds more
//! than one slab of values in memory. The coordinate vectors are small and are
//! read eagerly on open.

use std::path::Path;
use std::sync::Once;

use tracing::debug;

use crate::error::{NetCdfError, NetCdfResult};
use crate::{parse_start_year, GridLayout, ValueEncoding};

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist).
///
/// **Important**: Call this early in `main()` before any HDF5/NetCDF
/// operations occur. It is safe to call multiple times.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An open PM2.5 grid file.
pub struct NetCdfGrid {
    file: netcdf::File,
    value_variable: String,
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    year: i32,
    encoding: ValueEncoding,
}

impl NetCdfGrid {
    /// Open a grid file and read its coordinates, year and value encoding.
    pub fn open<P: AsRef<Path>>(path: P, layout: &GridLayout) -> NetCdfResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref();
        let file = netcdf::open(path).map_err(|e| {
            NetCdfError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let latitudes = read_coordinate(&file, &layout.lat_variable)?;
        let longitudes = read_coordinate(&file, &layout.lon_variable)?;
        let year = read_year(&file, &layout.year_attribute)?;

        let value_var = file
            .variable(&layout.value_variable)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", layout.value_variable)))?;

        let shape: Vec<usize> = value_var.dimensions().iter().map(|d| d.len()).collect();
        if shape != [latitudes.len(), longitudes.len()] {
            return Err(NetCdfError::InvalidFormat(format!(
                "{} has shape {:?}, expected [{}, {}]",
                layout.value_variable,
                shape,
                latitudes.len(),
                longitudes.len()
            )));
        }

        let encoding = ValueEncoding {
            scale_factor: get_f64_attr(&value_var, "scale_factor"),
            add_offset: get_f64_attr(&value_var, "add_offset"),
            fill_value: get_f64_attr(&value_var, "_FillValue"),
            missing_value: get_f64_attr(&value_var, "missing_value"),
        };
        drop(value_var);

        debug!(
            path = %path.display(),
            year = year,
            n_lat = latitudes.len(),
            n_lon = longitudes.len(),
            "Opened NetCDF grid"
        );

        Ok(Self {
            file,
            value_variable: layout.value_variable.clone(),
            latitudes,
            longitudes,
            year,
            encoding,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn latitudes(&self) -> &[f64] {
        &self.latitudes
    }

    pub fn longitudes(&self) -> &[f64] {
        &self.longitudes
    }

    /// Read `row_count` whole latitude rows starting at `row_start`.
    ///
    /// Values are returned row-major and already decoded (masked cells are NaN).
    pub fn read_rows(&self, row_start: usize, row_count: usize) -> NetCdfResult<Vec<f64>> {
        let rows = self.latitudes.len();
        let row_end = row_start + row_count;
        if row_end > rows {
            return Err(NetCdfError::RowsOutOfRange {
                start: row_start,
                end: row_end,
                rows,
            });
        }

        let var = self
            .file
            .variable(&self.value_variable)
            .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", self.value_variable)))?;

        let mut values: Vec<f64> = var
            .get_values((row_start..row_end, ..))
            .map_err(|e| {
                NetCdfError::InvalidFormat(format!(
                    "Failed to read {} rows {}..{}: {}",
                    self.value_variable, row_start, row_end, e
                ))
            })?;

        self.encoding.decode(&mut values);
        Ok(values)
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn read_coordinate(file: &netcdf::File, name: &str) -> NetCdfResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} variable", name)))?;

    var.get_values(..)
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))
}

fn read_year(file: &netcdf::File, name: &str) -> NetCdfResult<i32> {
    let value = file
        .attribute(name)
        .ok_or_else(|| NetCdfError::MissingData(format!("{} attribute", name)))?
        .value()
        .map_err(|e| NetCdfError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

    let text = match value {
        netcdf::AttributeValue::Str(s) => s,
        netcdf::AttributeValue::Strs(strs) => strs.into_iter().next().unwrap_or_default(),
        // Numeric dates such as 20190101
        other => {
            let number = f64::try_from(other).map_err(|_| {
                NetCdfError::InvalidFormat(format!("{} is neither text nor numeric", name))
            })?;
            format!("{}", number as i64)
        }
    };

    parse_start_year(&text)
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}
