//! types.rs
//! Shared data model: device observations, the campus bounding box,
//! the building cluster table and the service configuration.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// One device observation. Immutable once created; validity against the
/// bounding box is checked at binning time, not at construction, so
/// out-of-bounds observations may be stored but never aggregated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Fixed geographic rectangle for one deployment (one campus map).
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn contains(&self, p: &Point) -> bool {
        self.min_lat <= p.lat
            && p.lat <= self.max_lat
            && self.min_lon <= p.lon
            && p.lon <= self.max_lon
    }

    /// Clamp each axis independently into the box.
    pub fn clamp(&self, p: Point) -> Point {
        Point {
            lat: p.lat.max(self.min_lat).min(self.max_lat),
            lon: p.lon.max(self.min_lon).min(self.max_lon),
        }
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }
}

impl Default for BoundingBox {
    /// UNC Charlotte campus map bounds.
    fn default() -> Self {
        Self {
            min_lat: 35.3030,
            max_lat: 35.3120,
            min_lon: -80.7365,
            max_lon: -80.7275,
        }
    }
}

/// A named point of interest devices cluster around. `radius` is the spread
/// in degrees, `weight` the relative share of sampled devices; weights need
/// not sum to 1, they are normalized at use time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub weight: f64,
}

impl Cluster {
    pub fn center(&self) -> Point {
        Point::new(self.lat, self.lon)
    }
}

macro_rules! cluster {
    ($name:expr, $lat:expr, $lon:expr, $radius:expr, $weight:expr) => {
        Cluster { name: $name.into(), lat: $lat, lon: $lon, radius: $radius, weight: $weight }
    };
}

/// Built-in cluster table for the default campus map. Overridable with a
/// JSON file via `CLUSTERS_PATH`.
pub static CAMPUS_CLUSTERS: Lazy<Vec<Cluster>> = Lazy::new(|| {
    vec![
        cluster!("Atkins Library", 35.3079, -80.7335, 0.00020, 0.12),
        cluster!("Popp Martin Student Union", 35.3090, -80.7352, 0.00020, 0.10),
        cluster!("Woodward Hall", 35.3086, -80.7350, 0.00018, 0.08),
        cluster!("Barnhardt Student Activity Center", 35.3080, -80.7355, 0.00020, 0.08),
        cluster!("Belk Gymnasium", 35.3072, -80.7360, 0.00018, 0.07),
        cluster!("Fretwell Hall", 35.3087, -80.7318, 0.00018, 0.07),
        cluster!("Kennedy Hall", 35.3084, -80.7328, 0.00015, 0.06),
        cluster!("McEniry Hall", 35.3084, -80.7323, 0.00015, 0.06),
        cluster!("Robinson Hall", 35.3057, -80.7295, 0.00020, 0.05),
        cluster!("Belk Hall", 35.3113, -80.7360, 0.00015, 0.05),
        cluster!("Wallis Hall", 35.3115, -80.7350, 0.00015, 0.04),
        cluster!("Cameron Hall", 35.3088, -80.7330, 0.00015, 0.05),
        cluster!("Smith Hall", 35.3085, -80.7332, 0.00015, 0.04),
        cluster!("Denny Hall", 35.3082, -80.7325, 0.00015, 0.04),
        cluster!("Garinger Hall", 35.3081, -80.7320, 0.00015, 0.04),
        cluster!("Rowe Hall", 35.3080, -80.7312, 0.00015, 0.03),
        cluster!("Storrs Hall", 35.3079, -80.7308, 0.00015, 0.03),
        cluster!("Macy Hall", 35.3083, -80.7324, 0.00014, 0.03),
        cluster!("Friday Hall", 35.3084, -80.7321, 0.00014, 0.03),
        cluster!("King & Reese (res)", 35.3081, -80.7338, 0.00013, 0.02),
        cluster!("Oak / Elm / Maple / Pine (Dorms)", 35.3089, -80.7320, 0.00020, 0.05),
    ]
});

/// Load a cluster table from a JSON file (array of `Cluster`).
pub fn load_clusters(path: &str) -> Result<Vec<Cluster>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading cluster file {path}"))?;
    let clusters: Vec<Cluster> =
        serde_json::from_str(&text).with_context(|| format!("parsing cluster file {path}"))?;
    Ok(clusters)
}

#[derive(Clone, Debug)]
pub struct AppCfg {
    pub bind: String,
    pub bbox: BoundingBox,
    pub grid_size: usize,
    /// Optional JSON file overriding the built-in cluster table.
    pub clusters_path: Option<String>,
    /// Devices to synthesize into the store at startup.
    pub seed_devices: usize,
    /// Fixed RNG seed for reproducible sampling; entropy-seeded when unset.
    pub rng_seed: Option<u64>,
}

impl Default for AppCfg {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".into(),
            bbox: BoundingBox::default(),
            grid_size: 10,
            clusters_path: None,
            seed_devices: 0,
            rng_seed: None,
        }
    }
}
