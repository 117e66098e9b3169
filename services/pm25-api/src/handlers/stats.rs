//! Year statistics handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    Json,
};
use grid_index::StatsReport;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub count: usize,
    pub average_pm2_5: f64,
    pub min_pm2_5: f64,
    pub max_pm2_5: f64,
    pub years_available: Vec<i32>,
}

impl From<StatsReport> for StatsResponse {
    fn from(report: StatsReport) -> Self {
        Self {
            count: report.count,
            average_pm2_5: report.average,
            min_pm2_5: report.min,
            max_pm2_5: report.max,
            years_available: report.years_available,
        }
    }
}

/// GET /data/stats - statistics for one year, or all years when omitted
///
/// An unknown year returns a zero-valued report rather than 404.
pub async fn stats_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<StatsParams>,
) -> Json<StatsResponse> {
    Json(state.service.get_stats(params.year).into())
}
