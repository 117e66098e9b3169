//! Request and index metrics.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, gauge, histogram};

/// Timer guard for measuring operation duration.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// Count and time every routed request, labelled by route template.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());
    let method = req.method().to_string();

    let timer = Timer::start();
    let response = next.run(req).await;
    let status = response.status().as_u16().to_string();

    counter!(
        "pm25_requests_total",
        "route" => route.clone(),
        "method" => method,
        "status" => status
    )
    .increment(1);
    histogram!("pm25_request_duration_seconds", "route" => route).record(timer.elapsed_secs());

    response
}

/// Publish the shape of the index built at startup.
pub fn record_index_summary(files: usize, total_points: usize, years: usize) {
    gauge!("pm25_index_files").set(files as f64);
    gauge!("pm25_index_points").set(total_points as f64);
    gauge!("pm25_index_years").set(years as f64);
}

/// Location-filtered counts re-scan every file.
pub fn record_full_rescan() {
    counter!("pm25_count_rescans_total").increment(1);
}

/// Overlay mutation by kind: create, update or delete.
pub fn record_overlay_write(kind: &'static str) {
    counter!("pm25_overlay_writes_total", "kind" => kind).increment(1);
}
