//! service.rs
//!
//! Entry points the HTTP layer calls into. Owns the tile aggregator behind a
//! `tokio::sync::RwLock`: writers are serialized, and the write guard is held
//! across the full rebuild-then-read cycle so each response is internally
//! consistent while the store keeps changing between requests.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::aggregate::TileAggregator;
use crate::sampler::{self, SampleError};
use crate::store::{DeviceStore, StoreError};
use crate::types::{BoundingBox, Cluster, Point};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Sample(#[from] SampleError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct HeatmapService {
    store: Arc<dyn DeviceStore>,
    agg: RwLock<TileAggregator>,
    clusters: Vec<Cluster>,
    bbox: BoundingBox,
    grid_size: usize,
    rng: Mutex<StdRng>,
}

impl HeatmapService {
    pub fn new(
        store: Arc<dyn DeviceStore>,
        bbox: BoundingBox,
        grid_size: usize,
        clusters: Vec<Cluster>,
        rng_seed: Option<u64>,
    ) -> Self {
        let rng = match rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            store,
            agg: RwLock::new(TileAggregator::new(bbox, grid_size)),
            clusters,
            bbox,
            grid_size,
            rng: Mutex::new(rng),
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Rebuild from the store and return the density level per tile.
    pub async fn density_snapshot(&self) -> Result<Vec<u8>, ServiceError> {
        let points = self.store.list_points()?;
        let mut agg = self.agg.write().await;
        agg.rebuild(&points);
        Ok(agg.densities())
    }

    /// Rebuild from the store and return raw counts per tile.
    pub async fn tile_counts(&self) -> Result<Vec<u32>, ServiceError> {
        let points = self.store.list_points()?;
        let mut agg = self.agg.write().await;
        agg.rebuild(&points);
        Ok(agg.snapshot())
    }

    /// Rebuild from the store and return the colored-tile FeatureCollection.
    pub async fn map_geojson(&self) -> Result<serde_json::Value, ServiceError> {
        let points = self.store.list_points()?;
        let mut agg = self.agg.write().await;
        agg.rebuild(&points);
        Ok(agg.to_geojson())
    }

    pub async fn reset_counts(&self) {
        self.agg.write().await.reset();
    }

    /// Synthesize `clustered` devices around the configured buildings plus
    /// `uniform` background devices, append them to the store, and return
    /// how many were inserted.
    pub async fn generate_and_store(
        &self,
        clustered: usize,
        uniform: usize,
    ) -> Result<usize, ServiceError> {
        let points = {
            let mut rng = self.rng.lock().await;
            sampler::generate_mixed(&self.clusters, clustered, uniform, &self.bbox, &mut *rng)?
        };
        self.store.append_points(&points)?;
        info!(inserted = points.len(), "synthesized devices into store");
        Ok(points.len())
    }

    /// Ingest one externally observed device position.
    pub async fn add_device(&self, point: Point) -> Result<(), ServiceError> {
        self.store.append_points(&[point])?;
        Ok(())
    }

    pub async fn device_count(&self) -> Result<usize, ServiceError> {
        Ok(self.store.list_points()?.len())
    }
}
