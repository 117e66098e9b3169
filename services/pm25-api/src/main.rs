//! PM2.5 API Server
//!
//! Indexes every grid file in the data directory once, then serves
//! paginated and filtered views of the records over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use grid_index::{GridDataService, GridReader, IndexConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use pm25_api::state::AppState;
use pm25_api::{build_router, data_dir, metrics};

/// PM2.5 API Server
#[derive(Parser, Debug)]
#[command(name = "pm25-api")]
#[command(about = "Paginated query service over gridded PM2.5 files")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "PM25_LISTEN_ADDR")]
    listen: String,

    /// Directory holding the grid files
    #[arg(long, default_value = "data", env = "PM25_DATA_DIR")]
    data_dir: PathBuf,

    /// Zip archive to fetch when the data directory has no grid files
    #[arg(long, env = "PM25_ARCHIVE_URL")]
    archive_url: Option<String>,

    /// Index configuration file (YAML)
    #[arg(long, env = "PM25_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "PM25_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting PM2.5 API server");

    let config = match &args.config {
        Some(path) => IndexConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => IndexConfig::from_env(),
    };

    let paths = data_dir::prepare_data_dir(
        &args.data_dir,
        args.archive_url.as_deref(),
        &config,
    )
    .await?;

    let reader = grid_reader(&config)?;

    // The only full scan; nothing is served until it completes
    let service = tokio::task::spawn_blocking(move || {
        GridDataService::initialize(reader, &paths, config)
    })
    .await
    .context("Index task failed")?
    .context("Failed to index grid files")?;

    metrics::record_index_summary(
        service.files().len(),
        service.total_points()?,
        service.years().len(),
    );

    let state = Arc::new(AppState::new(service, Some(prometheus_handle)));
    let app = build_router(state);

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address {}", args.listen))?;

    info!(address = %addr, "PM2.5 API listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}

#[cfg(feature = "native")]
fn grid_reader(config: &IndexConfig) -> Result<Arc<dyn GridReader>> {
    netcdf_parser::silence_hdf5_errors();
    Ok(Arc::new(grid_index::NetCdfGridReader::new(config.layout())))
}

#[cfg(not(feature = "native"))]
fn grid_reader(_config: &IndexConfig) -> Result<Arc<dyn GridReader>> {
    anyhow::bail!("pm25-api was built without the `native` feature and cannot read NetCDF files")
}
