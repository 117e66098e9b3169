//! PM2.5 API Service Library
//!
//! HTTP query service over a directory of gridded PM2.5 files: paginated
//! listing, year/location filtering, year statistics and single-record edits.

pub mod data_dir;
pub mod error;
pub mod handlers;
pub mod limits;
pub mod metrics;
pub mod state;

use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Router};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Records
        .route(
            "/data",
            get(handlers::data::list_data_handler).post(handlers::data::create_entry_handler),
        )
        .route("/data/stats", get(handlers::stats::stats_handler))
        .route("/data/filter", get(handlers::data::filter_data_handler))
        .route(
            "/data/:id",
            get(handlers::data::get_entry_handler)
                .put(handlers::data::update_entry_handler)
                .delete(handlers::data::delete_entry_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        .route_layer(middleware::from_fn(metrics::track_requests))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
