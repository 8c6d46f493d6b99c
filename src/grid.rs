//! grid.rs
//!
//! Maps coordinates onto the fixed N×N tile grid overlaid on the campus
//! bounding box, and back from a tile id to the rectangle it covers.
//!
//! Tile ids are row-major: `tile_id = row * grid_size + col`, with row 0 on
//! the northern (max latitude) edge and column 0 on the western (min
//! longitude) edge. The aggregator's counts array and the density vector are
//! index-aligned with this ordering, so it must not change on its own.

use crate::types::{BoundingBox, Point};

/// Locate the tile a point falls in, or `None` when the point lies outside
/// the bounding box on either axis (bounds are inclusive).
pub fn tile_for(p: &Point, bbox: &BoundingBox, grid_size: usize) -> Option<usize> {
    if !bbox.contains(p) {
        return None;
    }

    let n = grid_size as f64;
    // Normalize to [0,1); latitude is inverted so row 0 is the north edge.
    let lat_norm = 1.0 - (p.lat - bbox.min_lat) / bbox.lat_span();
    let lon_norm = (p.lon - bbox.min_lon) / bbox.lon_span();

    // A coordinate exactly at the max normalizes to 1.0 and would index one
    // past the last row/column; the clamp absorbs that boundary.
    let row = ((lat_norm * n) as usize).min(grid_size - 1);
    let col = ((lon_norm * n) as usize).min(grid_size - 1);

    Some(row * grid_size + col)
}

/// Inverse of `tile_for`: the sub-rectangle covered by a tile id. Used to
/// emit tile polygons for the map export.
pub fn tile_bounds(tile_id: usize, bbox: &BoundingBox, grid_size: usize) -> BoundingBox {
    let row = tile_id / grid_size;
    let col = tile_id % grid_size;
    let lat_step = bbox.lat_span() / grid_size as f64;
    let lon_step = bbox.lon_span() / grid_size as f64;

    BoundingBox {
        max_lat: bbox.max_lat - row as f64 * lat_step,
        min_lat: bbox.max_lat - (row + 1) as f64 * lat_step,
        min_lon: bbox.min_lon + col as f64 * lon_step,
        max_lon: bbox.min_lon + (col + 1) as f64 * lon_step,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox() -> BoundingBox {
        BoundingBox::default()
    }

    #[test]
    fn corners_map_to_first_and_last_tile() {
        let b = bbox();
        // North-west corner is tile 0, south-east corner the last tile.
        assert_eq!(tile_for(&Point::new(b.max_lat, b.min_lon), &b, 10), Some(0));
        assert_eq!(tile_for(&Point::new(b.min_lat, b.max_lon), &b, 10), Some(99));
    }

    #[test]
    fn out_of_bounds_is_none() {
        let b = bbox();
        assert_eq!(tile_for(&Point::new(b.max_lat + 0.001, -80.7300), &b, 10), None);
        assert_eq!(tile_for(&Point::new(b.min_lat - 0.001, -80.7300), &b, 10), None);
        assert_eq!(tile_for(&Point::new(35.3080, b.min_lon - 0.001), &b, 10), None);
        assert_eq!(tile_for(&Point::new(35.3080, b.max_lon + 0.001), &b, 10), None);
    }

    #[test]
    fn interior_points_stay_in_range() {
        let b = bbox();
        let n = 10;
        for i in 1..100 {
            let lat = b.min_lat + b.lat_span() * (i as f64 / 100.0);
            let lon = b.min_lon + b.lon_span() * (i as f64 / 100.0);
            let id = tile_for(&Point::new(lat, lon), &b, n).unwrap();
            assert!(id < n * n);
        }
    }

    #[test]
    fn rows_run_north_to_south() {
        let b = bbox();
        let near_north = tile_for(&Point::new(b.max_lat - 1e-5, -80.7320), &b, 10).unwrap();
        let near_south = tile_for(&Point::new(b.min_lat + 1e-5, -80.7320), &b, 10).unwrap();
        assert!(near_north / 10 == 0);
        assert!(near_south / 10 == 9);
    }

    #[test]
    fn tile_bounds_round_trips_through_tile_for() {
        let b = bbox();
        for tile_id in [0, 7, 42, 99] {
            let t = tile_bounds(tile_id, &b, 10);
            let center = Point::new(
                (t.min_lat + t.max_lat) / 2.0,
                (t.min_lon + t.max_lon) / 2.0,
            );
            assert_eq!(tile_for(&center, &b, 10), Some(tile_id));
        }
    }

    #[test]
    fn tile_bounds_tiles_the_box_exactly() {
        let b = bbox();
        let first = tile_bounds(0, &b, 10);
        let last = tile_bounds(99, &b, 10);
        assert!((first.max_lat - b.max_lat).abs() < 1e-12);
        assert!((first.min_lon - b.min_lon).abs() < 1e-12);
        assert!((last.min_lat - b.min_lat).abs() < 1e-9);
        assert!((last.max_lon - b.max_lon).abs() < 1e-9);
    }
}
