//! Common grid fixtures.
//!
//! Fixtures are plain data so any crate can turn them into its own grid
//! representation without a dependency cycle.

use crate::generators::{regular_axis, sequential_values};

/// A synthetic grid file: one year of values over a lat/lon grid.
#[derive(Debug, Clone)]
pub struct SyntheticGrid {
    /// File name, used as the file id
    pub name: String,
    pub year: i32,
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    /// Row-major values, `latitudes.len() * longitudes.len()` long
    pub values: Vec<f64>,
}

impl SyntheticGrid {
    pub fn new(
        name: &str,
        year: i32,
        latitudes: Vec<f64>,
        longitudes: Vec<f64>,
        values: Vec<f64>,
    ) -> Self {
        assert_eq!(
            values.len(),
            latitudes.len() * longitudes.len(),
            "value count must match grid shape"
        );
        Self {
            name: name.to_string(),
            year,
            latitudes,
            longitudes,
            values,
        }
    }

    /// Total number of cells, NaN included.
    pub fn point_count(&self) -> usize {
        self.values.len()
    }

    /// Flattened non-NaN cells as `(latitude, longitude, value)`, row-major.
    pub fn cells(&self) -> Vec<(f64, f64, f64)> {
        let n_lon = self.longitudes.len();
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .map(|(i, v)| (self.latitudes[i / n_lon], self.longitudes[i % n_lon], *v))
            .collect()
    }
}

/// Two-file fixture.
///
/// - `a_2020.nc`: 3 latitude rows x 2 longitudes, year 2020, values 1..=6
/// - `b_2021.nc`: 2 latitude rows x 2 longitudes, year 2021, values 10, 20, 30, 40
pub fn two_file_fixture() -> Vec<SyntheticGrid> {
    vec![
        SyntheticGrid::new(
            "a_2020.nc",
            2020,
            vec![10.0, 10.5, 11.0],
            vec![-100.0, -99.5],
            sequential_values(1.0, 6),
        ),
        SyntheticGrid::new(
            "b_2021.nc",
            2021,
            vec![20.0, 20.5],
            vec![-80.0, -79.5],
            vec![10.0, 20.0, 30.0, 40.0],
        ),
    ]
}

/// Single 2x3 grid (year 2019) with NaN in cells 1 and 4.
pub fn nan_fixture() -> SyntheticGrid {
    SyntheticGrid::new(
        "nan_2019.nc",
        2019,
        vec![0.0, 1.0],
        vec![0.0, 1.0, 2.0],
        vec![5.0, f64::NAN, 7.0, 8.0, f64::NAN, 2.0],
    )
}

/// Three files where two share a year, for accumulation tests.
///
/// - `c1_2018.nc`: 2x2, 2018
/// - `c2_2018.nc`: 1x3, 2018 (one NaN)
/// - `c3_2022.nc`: 2x2, 2022
pub fn multi_year_fixture() -> Vec<SyntheticGrid> {
    vec![
        SyntheticGrid::new(
            "c1_2018.nc",
            2018,
            regular_axis(30.0, 0.1, 2),
            regular_axis(5.0, 0.1, 2),
            vec![3.5, 12.25, 0.75, 9.0],
        ),
        SyntheticGrid::new(
            "c2_2018.nc",
            2018,
            vec![31.0],
            regular_axis(6.0, 0.1, 3),
            vec![15.5, f64::NAN, 1.25],
        ),
        SyntheticGrid::new(
            "c3_2022.nc",
            2022,
            regular_axis(30.0, 0.1, 2),
            regular_axis(5.0, 0.1, 2),
            vec![22.0, 18.0, 40.5, 2.5],
        ),
    ]
}

/// A grid whose every cell is NaN.
pub fn all_nan_fixture() -> SyntheticGrid {
    SyntheticGrid::new(
        "empty_2017.nc",
        2017,
        vec![0.0, 1.0],
        vec![0.0],
        vec![f64::NAN, f64::NAN],
    )
}
