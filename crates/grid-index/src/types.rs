//! Core types for the grid index.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One grid cell of one file.
///
/// Serialized with the field names the HTTP API has always exposed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    #[serde(rename = "Year", alias = "year")]
    pub year: i32,
    #[serde(rename = "Latitude", alias = "latitude")]
    pub latitude: f64,
    #[serde(rename = "Longitude", alias = "longitude")]
    pub longitude: f64,
    #[serde(rename = "PM2_5_Level", alias = "value")]
    pub value: f64,
}

impl PointRecord {
    pub fn new(year: i32, latitude: f64, longitude: f64, value: f64) -> Self {
        Self {
            year,
            latitude,
            longitude,
            value,
        }
    }
}

/// Position of one grid file in the global point ordering.
///
/// Entries partition `[0, total_points)`: `global_start` of entry `i` equals
/// the sum of `point_count` over entries `0..i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileIndexEntry {
    /// File name, used as the public file id.
    pub file_id: String,
    /// Location the file is re-opened from.
    #[serde(skip)]
    pub path: PathBuf,
    /// Number of grid cells, NaN cells included.
    pub point_count: usize,
    /// Inclusive start of the file's global range.
    pub global_start: usize,
    /// Exclusive end of the file's global range.
    pub global_end: usize,
}

impl FileIndexEntry {
    /// Whether the global index falls inside this file's range.
    pub fn contains(&self, index: usize) -> bool {
        index >= self.global_start && index < self.global_end
    }

    /// 1-based page holding `global_start`, for pages of `page_size` records.
    pub fn first_page(&self, page_size: usize) -> usize {
        self.global_start / page_size.max(1) + 1
    }

    /// 1-based page holding the last record, for pages of `page_size` records.
    pub fn last_page(&self, page_size: usize) -> usize {
        self.global_end.div_ceil(page_size.max(1))
    }
}

/// Running statistics for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearStats {
    pub count: usize,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Default for YearStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl YearStats {
    /// Fold the summary of one batch slice into the running statistics.
    pub fn merge(&mut self, other: &YearStats) {
        if other.count == 0 {
            return;
        }
        self.count += other.count;
        self.sum += other.sum;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Summarize a set of values (none of them NaN).
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut stats = Self::default();
        for value in values {
            stats.count += 1;
            stats.sum += value;
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);
        }
        stats
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Statistics report for one year or for all years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub years_available: Vec<i32>,
}

impl StatsReport {
    /// The zero-valued report returned for an unknown year.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average: 0.0,
            min: 0.0,
            max: 0.0,
            years_available: Vec::new(),
        }
    }
}

/// Optional year and location filters for range and count queries.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecordFilter {
    pub year: Option<i32>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_lat(mut self, lat: f64) -> Self {
        self.lat = Some(lat);
        self
    }

    pub fn with_lon(mut self, lon: f64) -> Self {
        self.lon = Some(lon);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && !self.has_location()
    }

    pub fn has_location(&self) -> bool {
        self.lat.is_some() || self.lon.is_some()
    }

    /// Year equality and an inclusive `±tolerance` band on each coordinate.
    pub fn matches(&self, record: &PointRecord, tolerance: f64) -> bool {
        if let Some(year) = self.year {
            if record.year != year {
                return false;
            }
        }
        if let Some(lat) = self.lat {
            if record.latitude < lat - tolerance || record.latitude > lat + tolerance {
                return false;
            }
        }
        if let Some(lon) = self.lon {
            if record.longitude < lon - tolerance || record.longitude > lon + tolerance {
                return false;
            }
        }
        true
    }

    /// Drop records that do not match.
    pub fn apply(&self, records: &mut Vec<PointRecord>, tolerance: f64) {
        if !self.is_empty() {
            records.retain(|record| self.matches(record, tolerance));
        }
    }
}

/// Records materialized from one file, in the file's row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct FileGroup {
    pub file_id: String,
    pub records: Vec<PointRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(start: usize, count: usize) -> FileIndexEntry {
        FileIndexEntry {
            file_id: "f.nc".to_string(),
            path: PathBuf::from("f.nc"),
            point_count: count,
            global_start: start,
            global_end: start + count,
        }
    }

    #[test]
    fn test_entry_contains_is_half_open() {
        let e = entry(5, 3);
        assert!(!e.contains(4));
        assert!(e.contains(5));
        assert!(e.contains(7));
        assert!(!e.contains(8));
    }

    #[test]
    fn test_entry_pages() {
        let e = entry(150, 100);
        assert_eq!(e.first_page(100), 2);
        assert_eq!(e.last_page(100), 3);
        assert_eq!(entry(0, 100).last_page(100), 1);
    }

    #[test]
    fn test_year_stats_merge() {
        let mut stats = YearStats::default();
        stats.merge(&YearStats::from_values([3.0, 1.0]));
        stats.merge(&YearStats::from_values([7.0]));
        stats.merge(&YearStats::default());

        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, 11.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 7.0);
    }

    #[test]
    fn test_average_guards_zero_count() {
        assert_eq!(YearStats::default().average(), 0.0);
    }

    #[test]
    fn test_filter_tolerance_band_is_inclusive() {
        let filter = RecordFilter::new().with_lat(10.0);
        let tol = 0.5;
        assert!(filter.matches(&PointRecord::new(2020, 10.5, 0.0, 1.0), tol));
        assert!(filter.matches(&PointRecord::new(2020, 9.5, 0.0, 1.0), tol));
        assert!(!filter.matches(&PointRecord::new(2020, 10.75, 0.0, 1.0), tol));
    }

    #[test]
    fn test_filter_combines_all_conditions() {
        let filter = RecordFilter::new().with_year(2020).with_lat(1.0).with_lon(2.0);
        let hit = PointRecord::new(2020, 1.0, 2.0, 3.0);
        assert!(filter.matches(&hit, 0.01));
        assert!(!filter.matches(&PointRecord { year: 2021, ..hit }, 0.01));
        assert!(!filter.matches(&PointRecord { longitude: 2.5, ..hit }, 0.01));
        assert!(!filter.is_empty());
        assert!(filter.has_location());
        assert!(RecordFilter::new().is_empty());
    }

    #[test]
    fn test_record_serialized_field_names() {
        let record = PointRecord::new(2019, 1.5, -2.5, 12.0);
        let yaml = serde_yaml::to_string(&record).unwrap();
        assert!(yaml.contains("Year: 2019"));
        assert!(yaml.contains("PM2_5_Level: 12.0"));
    }

    #[test]
    fn test_record_accepts_lowercase_aliases() {
        let record: PointRecord =
            serde_yaml::from_str("year: 2020\nlatitude: 1.0\nlongitude: 2.0\nvalue: 3.0\n")
                .unwrap();
        assert_eq!(record, PointRecord::new(2020, 1.0, 2.0, 3.0));
    }
}
