//! Generators for synthetic PM2.5-like grids.
//!
//! Values are predictable so tests can recompute expected records and
//! statistics directly from the inputs.

/// Evenly spaced coordinate axis: `start, start + step, ...` (`n` values).
pub fn regular_axis(start: f64, step: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Creates a test grid with predictable values.
///
/// Each cell value is `col * 1000 + row`, stored row-major (one latitude row
/// after another), so `grid[row * width + col] == col * 1000 + row`.
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50);
/// assert_eq!(grid[1], 1000.0);
/// assert_eq!(grid[10], 1.0);
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Sequential values `start, start + 1, ...` (`n` values).
pub fn sequential_values(start: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start + i as f64).collect()
}

/// Replaces every `every`-th value (starting at index 0) with NaN.
pub fn punch_nan_holes(values: &mut [f64], every: usize) {
    if every == 0 {
        return;
    }
    for value in values.iter_mut().step_by(every) {
        *value = f64::NAN;
    }
}
