//! api.rs
//! HTTP routes: /health, /kpis, /density, /map/grid, /devices,
//! /devices/generate and /counts/reset.

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

use crate::service::{HeatmapService, ServiceError};
use crate::types::Point;

#[derive(Clone)]
pub struct ApiState {
    pub svc: Arc<HeatmapService>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/kpis", get(kpis))
        .route("/density", get(density))
        .route("/map/grid", get(map_grid))
        .route("/devices", post(add_device))
        .route("/devices/generate", post(generate_devices))
        .route("/counts/reset", post(reset_counts))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Service(ServiceError),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(ServiceError::Sample(e)) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Service(e @ ServiceError::Store(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, e.to_string())
            }
        };
        (status, Json(json!({ "error": msg }))).into_response()
    }
}

/// Reject negative values arriving over the wire before they reach the core,
/// where counts are unsigned.
fn non_negative(value: i64, what: &str) -> Result<usize, ApiError> {
    usize::try_from(value).map_err(|_| ApiError::BadRequest(format!("{what} must be >= 0")))
}

#[derive(Serialize)]
struct Kpis {
    snapshot_ts_utc: String,
    devices: usize,
    grid_size: usize,
}

async fn kpis(State(st): State<ApiState>) -> Result<Json<Kpis>, ApiError> {
    let devices = st.svc.device_count().await?;
    Ok(Json(Kpis {
        snapshot_ts_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        devices,
        grid_size: st.svc.grid_size(),
    }))
}

/// Density level per tile, tile-id order (row-major from the north-west).
async fn density(State(st): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let levels = st.svc.density_snapshot().await?;
    Ok(Json(json!({ "grid_size": st.svc.grid_size(), "levels": levels })))
}

async fn map_grid(State(st): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let fc = st.svc.map_geojson().await?;
    let body = fc.to_string();
    Ok((
        [(CONTENT_TYPE, "application/geo+json; charset=utf-8")],
        body,
    ))
}

async fn add_device(
    State(st): State<ApiState>,
    Json(p): Json<Point>,
) -> Result<impl IntoResponse, ApiError> {
    st.svc.add_device(p).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "status": "ok", "lat": p.lat, "lon": p.lon })),
    ))
}

#[derive(Debug, Deserialize)]
struct GenerateQuery {
    /// Devices to cluster around the configured buildings.
    count: i64,
    /// Extra uniform background devices (default 0).
    uniform: Option<i64>,
}

async fn generate_devices(
    State(st): State<ApiState>,
    Query(q): Query<GenerateQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let clustered = non_negative(q.count, "count")?;
    let uniform = non_negative(q.uniform.unwrap_or(0), "uniform")?;
    let inserted = st.svc.generate_and_store(clustered, uniform).await?;
    Ok(Json(json!({ "inserted": inserted })))
}

async fn reset_counts(State(st): State<ApiState>) -> impl IntoResponse {
    st.svc.reset_counts().await;
    "ok"
}
