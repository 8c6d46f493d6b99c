mod aggregate;
mod api;
mod density;
mod grid;
mod sampler;
mod service;
mod store;
mod types;

use anyhow::Result;
use std::{env, sync::Arc};
use tokio::signal;
use tracing::{info, Level};

use service::HeatmapService;
use store::MemStore;
use types::{AppCfg, CAMPUS_CLUSTERS};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs
    tracing_subscriber::fmt().with_env_filter("info").with_max_level(Level::INFO).init();

    let cfg = app_cfg_from_env();
    anyhow::ensure!(cfg.grid_size >= 1, "GRID_SIZE must be at least 1");
    anyhow::ensure!(
        cfg.bbox.min_lat < cfg.bbox.max_lat && cfg.bbox.min_lon < cfg.bbox.max_lon,
        "bounding box must have min < max on both axes"
    );

    let clusters = match &cfg.clusters_path {
        Some(path) => {
            info!("loading cluster table from {path}");
            types::load_clusters(path)?
        }
        None => CAMPUS_CLUSTERS.clone(),
    };
    info!(clusters = clusters.len(), grid_size = cfg.grid_size, "configured");

    let store = Arc::new(MemStore::new());
    let svc = Arc::new(HeatmapService::new(
        store,
        cfg.bbox,
        cfg.grid_size,
        clusters,
        cfg.rng_seed,
    ));

    if cfg.seed_devices > 0 {
        let inserted = svc.generate_and_store(cfg.seed_devices, 0).await?;
        info!(inserted, "seeded store at startup");
    }

    let app = api::router(api::ApiState { svc });
    info!("listening on http://{}", cfg.bind);
    let listener = tokio::net::TcpListener::bind(&cfg.bind).await?;
    let serve = axum::serve(listener, app);
    tokio::select! {
        r = serve => { r?; },
        _ = signal::ctrl_c() => { info!("shutdown signal received"); }
    }

    Ok(())
}

fn app_cfg_from_env() -> AppCfg {
    let mut c = AppCfg::default();
    if let Ok(v) = env::var("BIND") { c.bind = v; }
    if let Ok(v) = env::var("GRID_SIZE") { c.grid_size = v.parse().unwrap_or(c.grid_size); }
    if let Ok(v) = env::var("MIN_LAT") { c.bbox.min_lat = v.parse().unwrap_or(c.bbox.min_lat); }
    if let Ok(v) = env::var("MAX_LAT") { c.bbox.max_lat = v.parse().unwrap_or(c.bbox.max_lat); }
    if let Ok(v) = env::var("MIN_LON") { c.bbox.min_lon = v.parse().unwrap_or(c.bbox.min_lon); }
    if let Ok(v) = env::var("MAX_LON") { c.bbox.max_lon = v.parse().unwrap_or(c.bbox.max_lon); }
    if let Ok(v) = env::var("CLUSTERS_PATH") { c.clusters_path = Some(v); }
    if let Ok(v) = env::var("SEED_DEVICES") { c.seed_devices = v.parse().unwrap_or(c.seed_devices); }
    if let Ok(v) = env::var("RNG_SEED") { c.rng_seed = v.parse().ok(); }
    c
}
