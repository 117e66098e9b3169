//! NetCDF parser for gridded PM2.5 surface files.
//!
//! Each file holds one regular latitude/longitude grid of surface PM2.5
//! concentrations for a single year:
//!
//! - `lat` and `lon` coordinate variables (1-D)
//! - a 2-D value variable (`GWRPM25` by default) shaped `[lat, lon]`
//! - a global `Start_Date` attribute whose first four characters are the year
//!
//! # Implementation Notes
//!
//! Direct reading goes through the `netcdf` crate and needs libnetcdf/HDF5
//! on the host, so it lives behind the `native` feature. The layout and
//! decoding helpers below are pure Rust and always available.

pub mod error;
#[cfg(feature = "native")]
pub mod native;

pub use error::{NetCdfError, NetCdfResult};
#[cfg(feature = "native")]
pub use native::{silence_hdf5_errors, NetCdfGrid};

/// Default name of the PM2.5 value variable.
pub const DEFAULT_VALUE_VARIABLE: &str = "GWRPM25";

/// Variable and attribute names a grid file is decoded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// Latitude coordinate variable
    pub lat_variable: String,
    /// Longitude coordinate variable
    pub lon_variable: String,
    /// 2-D value variable shaped `[lat, lon]`
    pub value_variable: String,
    /// Global attribute carrying the start date of the grid
    pub year_attribute: String,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            lat_variable: "lat".to_string(),
            lon_variable: "lon".to_string(),
            value_variable: DEFAULT_VALUE_VARIABLE.to_string(),
            year_attribute: "Start_Date".to_string(),
        }
    }
}

/// Extract the calendar year from a start-date attribute.
///
/// Only the first four characters are significant, so `"2019-01-01"`,
/// `"20190101"` and `"2019"` all yield 2019.
pub fn parse_start_year(start_date: &str) -> NetCdfResult<i32> {
    let trimmed = start_date.trim();
    let prefix = trimmed.get(..4).ok_or_else(|| {
        NetCdfError::InvalidFormat(format!("start date too short: '{}'", trimmed))
    })?;

    prefix.parse::<i32>().map_err(|_| {
        NetCdfError::InvalidFormat(format!("start date has no leading year: '{}'", trimmed))
    })
}

/// Packing attributes of a value variable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ValueEncoding {
    pub scale_factor: Option<f64>,
    pub add_offset: Option<f64>,
    pub fill_value: Option<f64>,
    pub missing_value: Option<f64>,
}

impl ValueEncoding {
    /// Decode raw values in place: fill/missing cells become NaN, the rest
    /// are unpacked with scale and offset.
    pub fn decode(&self, values: &mut [f64]) {
        let scale = self.scale_factor.unwrap_or(1.0);
        let offset = self.add_offset.unwrap_or(0.0);

        for value in values.iter_mut() {
            if self.is_masked(*value) {
                *value = f64::NAN;
            } else {
                *value = *value * scale + offset;
            }
        }
    }

    fn is_masked(&self, raw: f64) -> bool {
        [self.fill_value, self.missing_value]
            .into_iter()
            .flatten()
            .any(|sentinel| raw == sentinel)
    }
}
