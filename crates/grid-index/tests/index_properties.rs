//! End-to-end properties of the grid data service over synthetic corpora.

use std::path::PathBuf;
use std::sync::Arc;

use grid_index::{
    FileGroup, GridDataService, GridIndexError, IndexConfig, MemoryGrid, MemoryGridReader,
    PointRecord, RecordFilter, StatsReport,
};
use test_utils::{
    assert_approx_eq, create_test_grid, multi_year_fixture, nan_fixture, punch_nan_holes,
    regular_axis, two_file_fixture, SyntheticGrid,
};

fn reader_for(fixtures: &[SyntheticGrid]) -> MemoryGridReader {
    let mut reader = MemoryGridReader::new();
    for f in fixtures {
        let grid = MemoryGrid::new(
            f.year,
            f.latitudes.clone(),
            f.longitudes.clone(),
            f.values.clone(),
        )
        .expect("fixture shape");
        reader.insert(PathBuf::from("/grids").join(&f.name), grid);
    }
    reader
}

fn service_with(fixtures: &[SyntheticGrid], batch_size: usize) -> GridDataService {
    let reader = reader_for(fixtures);
    let paths = reader.paths();
    let config = IndexConfig {
        batch_size,
        ..Default::default()
    };
    GridDataService::initialize(Arc::new(reader), &paths, config).expect("initialize")
}

/// Files of uneven shapes, years alternating 2015/2016.
fn uneven_corpus() -> Vec<SyntheticGrid> {
    [(3, 4), (1, 1), (5, 2), (2, 7), (4, 4)]
        .iter()
        .enumerate()
        .map(|(i, &(width, height))| {
            SyntheticGrid::new(
                &format!("grid_{:02}.nc", i),
                2015 + (i % 2) as i32,
                regular_axis(-10.0 + i as f64, 0.25, height),
                regular_axis(100.0, 0.25, width),
                create_test_grid(width, height)
                    .into_iter()
                    .map(|v| v + i as f64 * 0.5)
                    .collect(),
            )
        })
        .collect()
}

fn all_cells(fixtures: &[SyntheticGrid]) -> Vec<PointRecord> {
    fixtures
        .iter()
        .flat_map(|f| {
            f.cells()
                .into_iter()
                .map(move |(lat, lon, value)| PointRecord::new(f.year, lat, lon, value))
        })
        .collect()
}

fn flatten(groups: Vec<FileGroup>) -> Vec<PointRecord> {
    groups.into_iter().flat_map(|g| g.records).collect()
}

// =============================================================================
// Index table
// =============================================================================

#[test]
fn test_file_entries_partition_global_range() {
    let corpus = uneven_corpus();
    let svc = service_with(&corpus, 3);

    let files = svc.files();
    assert_eq!(files.len(), corpus.len());
    assert_eq!(files[0].global_start, 0);
    for pair in files.windows(2) {
        assert_eq!(pair[0].global_end, pair[1].global_start);
    }
    for (entry, fixture) in files.iter().zip(&corpus) {
        assert_eq!(entry.file_id, fixture.name);
        assert_eq!(entry.global_end - entry.global_start, fixture.point_count());
    }

    let expected: usize = corpus.iter().map(|f| f.point_count()).sum();
    assert_eq!(files.last().unwrap().global_end, expected);
    assert_eq!(svc.total_points().unwrap(), expected);
}

// =============================================================================
// Range materialization
// =============================================================================

#[test]
fn test_two_file_fixture_ranges() {
    let svc = service_with(&two_file_fixture(), 100_000);

    let groups = svc.get_range(0, 5, &RecordFilter::new()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].file_id, "a_2020.nc");
    let values: Vec<f64> = groups[0].records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let coords: Vec<(f64, f64)> = groups[0]
        .records
        .iter()
        .map(|r| (r.latitude, r.longitude))
        .collect();
    assert_eq!(
        coords,
        vec![
            (10.0, -100.0),
            (10.0, -99.5),
            (10.5, -100.0),
            (10.5, -99.5),
            (11.0, -100.0)
        ]
    );

    // File A holds indices 0..6, so file B starts at 6
    let groups = svc.get_range(6, 8, &RecordFilter::new()).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].file_id, "b_2021.nc");
    assert!(groups[0].records.iter().all(|r| r.year == 2021));
    let values: Vec<f64> = groups[0].records.iter().map(|r| r.value).collect();
    assert_eq!(values, vec![10.0, 20.0]);

    let groups = svc.get_range(5, 7, &RecordFilter::new()).unwrap();
    let ids: Vec<&str> = groups.iter().map(|g| g.file_id.as_str()).collect();
    assert_eq!(ids, vec!["a_2020.nc", "b_2021.nc"]);
    assert_eq!(
        flatten(groups).iter().map(|r| r.value).collect::<Vec<_>>(),
        vec![6.0, 10.0]
    );
}

#[test]
fn test_unfiltered_ranges_match_concatenated_cells() {
    let corpus = uneven_corpus();
    let expected = all_cells(&corpus);
    let total = expected.len();

    for batch_size in [1, 4, 9, 1000] {
        let svc = service_with(&corpus, batch_size);
        for start in 0..total {
            for end in (start + 1)..=(total + 2) {
                let got = flatten(svc.get_range(start, end, &RecordFilter::new()).unwrap());
                let want = &expected[start..end.min(total)];
                assert_eq!(
                    got, want,
                    "batch_size {} range {}..{}",
                    batch_size, start, end
                );
            }
        }
    }
}

#[test]
fn test_year_filter_counts_filtered_rows_from_zero() {
    let svc = service_with(&two_file_fixture(), 2);
    let filter = RecordFilter::new().with_year(2021);

    let records = flatten(svc.get_range(0, 3, &filter).unwrap());
    assert_eq!(
        records.iter().map(|r| r.value).collect::<Vec<_>>(),
        vec![10.0, 20.0, 30.0]
    );
    assert_eq!(svc.count(&filter).unwrap(), 4);
}

#[test]
fn test_filters_eliminating_all_candidates_give_empty_result() {
    let svc = service_with(&two_file_fixture(), 2);

    let by_year = RecordFilter::new().with_year(1980);
    assert!(svc.get_range(0, 10, &by_year).unwrap().is_empty());
    assert_eq!(svc.count(&by_year).unwrap(), 0);

    let by_location = RecordFilter::new().with_lat(10.0).with_lon(0.0);
    assert!(svc.get_range(0, 10, &by_location).unwrap().is_empty());
    assert_eq!(svc.count(&by_location).unwrap(), 0);
}

#[test]
fn test_range_beyond_total_is_empty_not_error() {
    let svc = service_with(&two_file_fixture(), 2);
    assert!(svc.get_range(10, 20, &RecordFilter::new()).unwrap().is_empty());
    assert!(matches!(
        svc.get_range(4, 2, &RecordFilter::new()),
        Err(GridIndexError::InvalidRange { start: 4, end: 2 })
    ));
}

#[test]
fn test_location_count_matches_brute_force() {
    let corpus = uneven_corpus();
    let svc = service_with(&corpus, 5);
    let tolerance = svc.config().location_tolerance;

    let filter = RecordFilter::new().with_lon(100.25);
    let expected = all_cells(&corpus)
        .iter()
        .filter(|r| (r.longitude - 100.25).abs() <= tolerance)
        .count();
    assert!(expected > 0);
    assert_eq!(svc.count(&filter).unwrap(), expected);

    let filter = RecordFilter::new().with_year(2016).with_lon(100.25);
    let expected = all_cells(&corpus)
        .iter()
        .filter(|r| r.year == 2016 && (r.longitude - 100.25).abs() <= tolerance)
        .count();
    assert_eq!(svc.count(&filter).unwrap(), expected);
}

#[test]
fn test_tolerance_is_configurable() {
    let fixtures = two_file_fixture();
    let reader = reader_for(&fixtures);
    let paths = reader.paths();
    let config = IndexConfig {
        location_tolerance: 0.6,
        ..Default::default()
    };
    let svc = GridDataService::initialize(Arc::new(reader), &paths, config).unwrap();

    // 10.5 +/- 0.6 covers every row of file A
    let filter = RecordFilter::new().with_lat(10.5);
    assert_eq!(svc.count(&filter).unwrap(), 6);
}

// =============================================================================
// Statistics and NaN handling
// =============================================================================

#[test]
fn test_stats_match_direct_computation() {
    let corpus = multi_year_fixture();
    let svc = service_with(&corpus, 2);

    for year in [2018, 2022] {
        let values: Vec<f64> = corpus
            .iter()
            .filter(|f| f.year == year)
            .flat_map(|f| f.cells().into_iter().map(|(_, _, v)| v))
            .collect();
        let sum: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let stats = svc.get_stats(Some(year));
        assert_eq!(stats.count, values.len());
        assert_eq!(stats.min, min);
        assert_eq!(stats.max, max);
        assert_approx_eq!(stats.average, sum / values.len() as f64, 1e-12);
        assert_eq!(stats.years_available, vec![year]);
    }

    let all = svc.get_stats(None);
    assert_eq!(all.count, 10);
    assert_eq!(all.years_available, vec![2018, 2022]);
    assert_eq!(svc.get_stats(Some(2000)), StatsReport::empty());
}

#[test]
fn test_nan_cells_absent_from_ranges_and_stats() {
    let mut values = create_test_grid(4, 5);
    punch_nan_holes(&mut values, 3);
    let holes = values.iter().filter(|v| v.is_nan()).count();
    let grid = SyntheticGrid::new(
        "holes_2019.nc",
        2019,
        regular_axis(0.0, 1.0, 5),
        regular_axis(0.0, 1.0, 4),
        values,
    );
    let svc = service_with(&[grid, nan_fixture()], 6);

    let records = flatten(svc.get_range(0, 100, &RecordFilter::new()).unwrap());
    assert!(records.iter().all(|r| !r.value.is_nan()));
    assert_eq!(records.len(), 20 - holes + 4);

    let stats = svc.get_stats(Some(2019));
    assert_eq!(stats.count, 20 - holes + 4);
    assert!(!stats.average.is_nan());

    // point_count still includes the NaN cells
    assert_eq!(svc.total_points().unwrap(), 26);
}

#[test]
fn test_read_paths_are_idempotent() {
    let svc = service_with(&uneven_corpus(), 4);
    let filter = RecordFilter::new().with_year(2016);

    let first = svc.get_range(3, 17, &filter).unwrap();
    let stats = svc.get_stats(None);
    for _ in 0..3 {
        assert_eq!(svc.get_range(3, 17, &filter).unwrap(), first);
        assert_eq!(svc.get_stats(None), stats);
    }
}

// =============================================================================
// Overlay
// =============================================================================

#[test]
fn test_overlay_takes_precedence_over_file_data() {
    let svc = service_with(&two_file_fixture(), 2);
    let original = svc.get_entry_by_id(3).unwrap().unwrap();
    assert_eq!(original.value, 4.0);

    let replacement = PointRecord::new(2099, -1.0, -2.0, 123.0);
    assert!(svc.update_entry(3, replacement).unwrap());
    assert_eq!(svc.get_entry_by_id(3).unwrap(), Some(replacement));

    assert!(svc.delete_entry(3).unwrap());
    assert_eq!(svc.get_entry_by_id(3).unwrap(), None);

    // Listings still show the file-backed record
    let listed = flatten(svc.get_range(3, 4, &RecordFilter::new()).unwrap());
    assert_eq!(listed, vec![original]);
}

#[test]
fn test_created_records_are_reachable_by_id_only() {
    let svc = service_with(&two_file_fixture(), 2);
    let stats_before = svc.get_stats(None);

    let record = PointRecord::new(2021, 20.0, -80.0, 55.5);
    let id = svc.create_entry(record).unwrap();
    assert_eq!(id, 10);
    assert_eq!(svc.create_entry(record).unwrap(), 11);

    assert_eq!(svc.get_entry_by_id(id).unwrap(), Some(record));
    assert_eq!(svc.total_points().unwrap(), 12);
    assert_eq!(svc.count(&RecordFilter::new()).unwrap(), 12);

    // Invisible to listings, year counts and statistics
    assert!(svc.get_range(10, 12, &RecordFilter::new()).unwrap().is_empty());
    assert_eq!(svc.count(&RecordFilter::new().with_year(2021)).unwrap(), 4);
    assert_eq!(svc.get_stats(None), stats_before);
    assert_eq!(svc.files().last().unwrap().global_end, 10);
}
