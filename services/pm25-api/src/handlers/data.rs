//! Record listing, filtering and single-record handlers.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use grid_index::{FileGroup, FileIndexEntry, PointRecord, RecordFilter};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::limits::{Page, PageParams};
use crate::metrics;
use crate::state::AppState;

/// One row of `files_info`, with pages computed for the request's page size.
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub file: String,
    pub total_points: usize,
    pub global_start: usize,
    pub global_end: usize,
    pub first_page: usize,
    pub last_page: usize,
}

impl FileInfo {
    fn new(entry: &FileIndexEntry, page_size: usize) -> Self {
        Self {
            file: entry.file_id.clone(),
            total_points: entry.point_count,
            global_start: entry.global_start,
            global_end: entry.global_end,
            first_page: entry.first_page(page_size),
            last_page: entry.last_page(page_size),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Files that contributed records to this page, in global order.
    pub data_from: Vec<String>,
    pub files_info: Vec<FileInfo>,
    pub data: Vec<PointRecord>,
}

#[derive(Debug, Serialize)]
pub struct FilterDataResponse {
    pub data: Vec<PointRecord>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
}

/// Query parameters for `/data/filter`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterParams {
    pub year: Option<i32>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl FilterParams {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            year: self.year,
            lat: self.lat,
            lon: self.long,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: usize,
}

/// GET /data - one page of the global listing
pub async fn list_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<PageParams>,
) -> ApiResult<Json<DataResponse>> {
    let page = Page::try_from(params)?;

    let groups = state
        .blocking(move |svc| svc.get_range(page.start, page.end, &RecordFilter::new()))
        .await?;

    let data_from: Vec<String> = groups.iter().map(|g| g.file_id.clone()).collect();
    let mut data = flatten(groups);
    data.truncate(page.page_size);

    let files_info = state
        .service
        .files()
        .iter()
        .map(|entry| FileInfo::new(entry, page.page_size))
        .collect();

    Ok(Json(DataResponse {
        page: page.page,
        page_size: page.page_size,
        total_items: state.service.total_points()?,
        data_from,
        files_info,
        data,
    }))
}

/// GET /data/filter - one page of records matching year and location filters
pub async fn filter_data_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<FilterParams>,
) -> ApiResult<Json<FilterDataResponse>> {
    let page = Page::from_params(params.page, params.page_size)?;
    let filter = params.filter();

    if filter.has_location() {
        if ![filter.lat, filter.lon].iter().flatten().all(|v| v.is_finite()) {
            return Err(ApiError::Validation(
                "lat and long must be finite numbers".to_string(),
            ));
        }
        metrics::record_full_rescan();
    }

    let (groups, total_items) = state
        .blocking(move |svc| {
            let groups = svc.get_range(page.start, page.end, &filter)?;
            let total = svc.count(&filter)?;
            Ok((groups, total))
        })
        .await?;

    Ok(Json(FilterDataResponse {
        data: flatten(groups),
        page: page.page,
        page_size: page.page_size,
        total_items,
    }))
}

/// GET /data/:id - one record by global index
pub async fn get_entry_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<usize>,
) -> ApiResult<Json<PointRecord>> {
    state
        .blocking(move |svc| svc.get_entry_by_id(id))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// POST /data - store a new record in the overlay
pub async fn create_entry_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(record): Json<PointRecord>,
) -> ApiResult<impl IntoResponse> {
    let id = state.service.create_entry(record)?;
    metrics::record_overlay_write("create");
    debug!(id = id, year = record.year, "Created record");

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// PUT /data/:id - replace a record in the overlay
pub async fn update_entry_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<usize>,
    Json(record): Json<PointRecord>,
) -> ApiResult<Json<PointRecord>> {
    let updated = state
        .blocking(move |svc| svc.update_entry(id, record))
        .await?;
    if !updated {
        return Err(not_found(id));
    }

    metrics::record_overlay_write("update");
    Ok(Json(record))
}

/// DELETE /data/:id - hide a record behind a tombstone
pub async fn delete_entry_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<usize>,
) -> ApiResult<StatusCode> {
    let deleted = state.blocking(move |svc| svc.delete_entry(id)).await?;
    if !deleted {
        return Err(not_found(id));
    }

    metrics::record_overlay_write("delete");
    Ok(StatusCode::NO_CONTENT)
}

fn flatten(groups: Vec<FileGroup>) -> Vec<PointRecord> {
    groups.into_iter().flat_map(|g| g.records).collect()
}

fn not_found(id: usize) -> ApiError {
    ApiError::NotFound(format!("no record with id {}", id))
}
