//! Configuration for the grid index.

use std::path::Path;

use netcdf_parser::GridLayout;
use serde::{Deserialize, Serialize};

use crate::error::{GridIndexError, Result};

/// Configuration for indexing and materializing grid files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Target number of cells per streamed batch. Batches always hold whole
    /// latitude rows, so the real size is rounded down to a row multiple
    /// (minimum one row).
    pub batch_size: usize,

    /// Half-width of the latitude/longitude filter band, in degrees.
    pub location_tolerance: f64,

    /// File extension of grid files in the data directory (without the dot).
    pub grid_extension: String,

    /// Latitude coordinate variable.
    pub lat_variable: String,

    /// Longitude coordinate variable.
    pub lon_variable: String,

    /// 2-D value variable.
    pub value_variable: String,

    /// Global attribute holding the grid's start date.
    pub year_attribute: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let layout = GridLayout::default();
        Self {
            batch_size: 100_000,
            location_tolerance: 0.01,
            grid_extension: "nc".to_string(),
            lat_variable: layout.lat_variable,
            lon_variable: layout.lon_variable,
            value_variable: layout.value_variable,
            year_attribute: layout.year_attribute,
        }
    }
}

impl IndexConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GridIndexError::ConfigError(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config.with_env_overrides())
    }

    /// Apply `GRID_*` environment variables on top of this configuration.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("GRID_BATCH_SIZE") {
            if let Ok(size) = val.parse() {
                self.batch_size = size;
            }
        }

        if let Ok(val) = std::env::var("GRID_LOCATION_TOLERANCE") {
            if let Ok(tolerance) = val.parse() {
                self.location_tolerance = tolerance;
            }
        }

        if let Ok(val) = std::env::var("GRID_VALUE_VARIABLE") {
            if !val.is_empty() {
                self.value_variable = val;
            }
        }

        if let Ok(val) = std::env::var("GRID_EXTENSION") {
            if !val.is_empty() {
                self.grid_extension = val.trim_start_matches('.').to_string();
            }
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be > 0".to_string());
        }

        if !self.location_tolerance.is_finite() || self.location_tolerance < 0.0 {
            return Err("location_tolerance must be a finite, non-negative number".to_string());
        }

        if self.grid_extension.is_empty() {
            return Err("grid_extension must not be empty".to_string());
        }

        Ok(())
    }

    /// Variable and attribute names for the NetCDF decoder.
    pub fn layout(&self) -> GridLayout {
        GridLayout {
            lat_variable: self.lat_variable.clone(),
            lon_variable: self.lon_variable.clone(),
            value_variable: self.value_variable.clone(),
            year_attribute: self.year_attribute.clone(),
        }
    }

    /// Whether `path` has the configured grid extension.
    pub fn is_grid_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == self.grid_extension)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = IndexConfig::default();
        assert_eq!(config.batch_size, 100_000);
        assert_eq!(config.location_tolerance, 0.01);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = IndexConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = IndexConfig {
            location_tolerance: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_yaml_with_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.yaml");
        std::fs::write(&path, "location_tolerance: 0.25\nvalue_variable: PM25\n").unwrap();

        let config = IndexConfig::load(&path).unwrap();
        assert_eq!(config.value_variable, "PM25");
        assert_eq!(config.lat_variable, "lat");
        assert_eq!(config.layout().value_variable, "PM25");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = IndexConfig::load("/nonexistent/index.yaml").unwrap_err();
        assert!(matches!(err, GridIndexError::ConfigError(_)));
    }

    #[test]
    fn test_is_grid_file() {
        let config = IndexConfig::default();
        assert!(config.is_grid_file(Path::new("/data/pm25_2019.nc")));
        assert!(!config.is_grid_file(Path::new("/data/readme.txt")));
        assert!(!config.is_grid_file(Path::new("/data/nc")));
    }
}
