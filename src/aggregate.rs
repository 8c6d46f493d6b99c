//! aggregate.rs
//!
//! Per-tile device counts and their density view.
//!
//! The counts array is owned by one `TileAggregator` instance and refreshed
//! only through `rebuild` (full recompute from the store contents), never
//! merged incrementally across rebuilds. Out-of-bounds observations are
//! dropped silently during aggregation; they are sensor noise outside the
//! mapped region, not an error.

use serde_json::json;

use crate::density;
use crate::grid::{tile_bounds, tile_for};
use crate::types::{BoundingBox, Point};

pub struct TileAggregator {
    bbox: BoundingBox,
    grid_size: usize,
    counts: Vec<u32>,
}

impl TileAggregator {
    pub fn new(bbox: BoundingBox, grid_size: usize) -> Self {
        Self { bbox, grid_size, counts: vec![0; grid_size * grid_size] }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Zero every tile. Idempotent.
    pub fn reset(&mut self) {
        self.counts.fill(0);
    }

    /// Count one observation. `None` and out-of-range ids are no-ops.
    pub fn increment(&mut self, tile_id: Option<usize>) {
        if let Some(id) = tile_id {
            if let Some(c) = self.counts.get_mut(id) {
                *c += 1;
            }
        }
    }

    /// Full recompute from a point collection: reset, then bin and count
    /// every in-bounds point.
    pub fn rebuild(&mut self, points: &[Point]) {
        self.reset();
        for p in points {
            self.increment(tile_for(p, &self.bbox, self.grid_size));
        }
    }

    /// Current counts in tile-id order, detached from the backing state.
    pub fn snapshot(&self) -> Vec<u32> {
        self.counts.clone()
    }

    /// Density level per tile, a fresh array each call.
    pub fn densities(&self) -> Vec<u8> {
        self.counts.iter().map(|&c| density::level_for(c)).collect()
    }

    /// Colored-tile FeatureCollection for the map. Only occupied tiles are
    /// emitted; empty ones would just paint the whole box.
    pub fn to_geojson(&self) -> serde_json::Value {
        let mut features = Vec::new();
        for (tile_id, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let level = density::level_for(count);
            let color = density::color_for(level);
            let t = tile_bounds(tile_id, &self.bbox, self.grid_size);
            let ring = [
                [t.min_lon, t.min_lat],
                [t.max_lon, t.min_lat],
                [t.max_lon, t.max_lat],
                [t.min_lon, t.max_lat],
                [t.min_lon, t.min_lat],
            ];
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [ring] },
                "properties": {
                    "tile_id": tile_id,
                    "count": count,
                    "level": level,
                    "style": {
                        "fill": true,
                        "fill-color": color, "fill-opacity": 0.75,
                        "stroke": color, "stroke-opacity": 1.0, "stroke-width": 1,
                        "fillColor": color, "fillOpacity": 0.75, "color": color, "opacity": 1.0, "weight": 1
                    }
                }
            }));
        }
        json!({ "type": "FeatureCollection", "features": features })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BoundingBox;

    fn agg() -> TileAggregator {
        TileAggregator::new(BoundingBox::default(), 10)
    }

    fn inside(frac_lat: f64, frac_lon: f64) -> Point {
        let b = BoundingBox::default();
        Point::new(
            b.min_lat + b.lat_span() * frac_lat,
            b.min_lon + b.lon_span() * frac_lon,
        )
    }

    #[test]
    fn rebuild_counts_only_in_bounds_points() {
        let mut a = agg();
        let points = vec![
            inside(0.15, 0.15),
            inside(0.15, 0.17),
            inside(0.80, 0.40),
            Point::new(0.0, 0.0), // far outside
        ];
        a.rebuild(&points);
        assert_eq!(a.snapshot().iter().sum::<u32>(), 3);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut a = agg();
        let points = vec![inside(0.3, 0.3), inside(0.3, 0.3), inside(0.9, 0.1)];
        a.rebuild(&points);
        let first = a.snapshot();
        a.rebuild(&points);
        assert_eq!(a.snapshot(), first);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut a = agg();
        a.rebuild(&[inside(0.5, 0.5)]);
        a.reset();
        let snap = a.snapshot();
        assert_eq!(snap.len(), 100);
        assert!(snap.iter().all(|&c| c == 0));
    }

    #[test]
    fn increment_ignores_none_and_out_of_range() {
        let mut a = agg();
        a.increment(None);
        a.increment(Some(100));
        a.increment(Some(usize::MAX));
        assert_eq!(a.snapshot().iter().sum::<u32>(), 0);
        a.increment(Some(42));
        assert_eq!(a.snapshot()[42], 1);
    }

    #[test]
    fn densities_track_counts() {
        let mut a = agg();
        let mut points = Vec::new();
        for _ in 0..7 {
            points.push(inside(0.05, 0.05)); // 7 in one tile -> level 2
        }
        points.push(inside(0.95, 0.95)); // 1 alone -> level 1
        a.rebuild(&points);
        let d = a.densities();
        assert_eq!(d.iter().filter(|&&l| l == 2).count(), 1);
        assert_eq!(d.iter().filter(|&&l| l == 1).count(), 1);
        assert_eq!(d.iter().filter(|&&l| l == 0).count(), 98);
    }

    #[test]
    fn snapshot_is_detached_from_state() {
        let mut a = agg();
        let snap = a.snapshot();
        a.increment(Some(0));
        assert_eq!(snap[0], 0);
        assert_eq!(a.snapshot()[0], 1);
    }

    #[test]
    fn geojson_emits_only_occupied_tiles() {
        let mut a = agg();
        a.rebuild(&[inside(0.12, 0.12), inside(0.88, 0.88)]);
        let fc = a.to_geojson();
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"].as_array().unwrap().len(), 2);
        let f = &fc["features"][0];
        assert_eq!(f["properties"]["level"], 1);
        assert!(f["properties"]["style"]["fill-color"].as_str().unwrap().starts_with('#'));
    }
}
