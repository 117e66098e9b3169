//! Windowed global index over a directory of gridded PM2.5 files
//!
//! A set of independently sized grid files is exposed as one virtual,
//! globally ordered sequence of point records without holding any file in
//! memory. It provides:
//!
//! - **One startup scan**: file index table and per-year statistics
//! - **Lazy ranges**: only files overlapping `[start, end)` are re-streamed
//! - **Edit overlay**: single-record create/update/delete in memory
//!
//! # Architecture
//!
//! ```text
//! GridDataService::initialize(reader, paths, config)
//!      │
//!      └─► WindowedAggregator   scan every file once
//!               │
//!               ├─► FileIndexEntry table   [0, 6)[6, 10)[10, ...)
//!               └─► YearStats              count / sum / min / max
//!
//! get_range(start, end, filter)
//!      │
//!      └─► RangeMaterializer
//!               ├─► skip files entirely before `start` (no I/O)
//!               └─► re-stream overlapping files: filter, then slice
//!
//! get_entry_by_id(id)
//!      │
//!      ├─► OverlayStore   record | tombstone
//!      └─► get_range(id, id + 1)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use grid_index::{GridDataService, IndexConfig, NetCdfGridReader, RecordFilter};
//!
//! let config = IndexConfig::from_env();
//! let reader = Arc::new(NetCdfGridReader::new(config.layout()));
//! let service = GridDataService::initialize(reader, &paths, config)?;
//!
//! let page = service.get_range(0, 100, &RecordFilter::new().with_year(2019))?;
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod materializer;
pub mod overlay;
pub mod reader;
pub mod service;
pub mod types;

pub use aggregator::WindowedAggregator;
pub use config::IndexConfig;
pub use error::{GridIndexError, Result};
pub use materializer::RangeMaterializer;
pub use overlay::{OverlaySlot, OverlayStore};
#[cfg(feature = "native")]
pub use reader::NetCdfGridReader;
pub use reader::{row_batches, GridFile, GridReader, MemoryGrid, MemoryGridReader};
pub use service::GridDataService;
pub use types::{FileGroup, FileIndexEntry, PointRecord, RecordFilter, StatsReport, YearStats};
