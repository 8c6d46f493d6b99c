//! sampler.rs
//!
//! Synthesizes device observations clustered around the campus buildings.
//!
//! Allocation is seed-then-distribute: when the requested total covers the
//! cluster list, every cluster is first given one point, and the remainder
//! is drawn multinomially with normalized weights. A pure weighted draw
//! could starve low-weight buildings entirely at small totals, and every
//! point of interest should show up on the map.
//!
//! Jittered points are clamped into the bounding box axis by axis, not
//! re-sampled, so a wide cluster near the border puts mass on the edge.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::Normal;
use thiserror::Error;

use crate::types::{BoundingBox, Cluster, Point};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("cluster list is empty")]
    EmptyClusters,
    #[error("cluster '{0}' has an invalid weight")]
    InvalidWeight(String),
    #[error("all cluster weights are zero")]
    ZeroWeightSum,
    #[error("cluster '{0}' has an invalid spread radius")]
    BadRadius(String),
}

fn validate(clusters: &[Cluster]) -> Result<(), SampleError> {
    if clusters.is_empty() {
        return Err(SampleError::EmptyClusters);
    }
    for c in clusters {
        // NaN would slip past a plain negative check and blow up the draw.
        if !c.weight.is_finite() || c.weight < 0.0 {
            return Err(SampleError::InvalidWeight(c.name.clone()));
        }
    }
    if clusters.iter().map(|c| c.weight).sum::<f64>() <= 0.0 {
        return Err(SampleError::ZeroWeightSum);
    }
    Ok(())
}

/// Points per cluster, index-aligned with `clusters`.
fn allocate<R: Rng>(clusters: &[Cluster], total: usize, rng: &mut R) -> Vec<usize> {
    let n = clusters.len();
    let mut alloc = vec![0usize; n];

    let remainder = if total >= n {
        alloc.fill(1);
        total - n
    } else {
        total
    };

    if remainder > 0 {
        // Weights are validated non-negative with a positive sum.
        let dist = WeightedIndex::new(clusters.iter().map(|c| c.weight))
            .expect("validated weights");
        for _ in 0..remainder {
            alloc[dist.sample(rng)] += 1;
        }
    }
    alloc
}

/// Draw `total` clustered device positions. Every returned point lies inside
/// the bounding box.
pub fn generate<R: Rng>(
    clusters: &[Cluster],
    total: usize,
    bbox: &BoundingBox,
    rng: &mut R,
) -> Result<Vec<Point>, SampleError> {
    validate(clusters)?;

    let alloc = allocate(clusters, total, rng);
    let mut points = Vec::with_capacity(total);
    for (c, &count) in clusters.iter().zip(&alloc) {
        if count == 0 {
            continue;
        }
        let jitter = Normal::new(0.0, c.radius / 2.0)
            .map_err(|_| SampleError::BadRadius(c.name.clone()))?;
        for _ in 0..count {
            let p = Point::new(c.lat + jitter.sample(rng), c.lon + jitter.sample(rng));
            points.push(bbox.clamp(p));
        }
    }
    Ok(points)
}

/// Uniform background noise over the whole box.
pub fn generate_uniform<R: Rng>(count: usize, bbox: &BoundingBox, rng: &mut R) -> Vec<Point> {
    (0..count)
        .map(|_| {
            Point::new(
                rng.gen_range(bbox.min_lat..=bbox.max_lat),
                rng.gen_range(bbox.min_lon..=bbox.max_lon),
            )
        })
        .collect()
}

/// Clustered points plus uniform background, concatenated.
pub fn generate_mixed<R: Rng>(
    clusters: &[Cluster],
    clustered: usize,
    uniform: usize,
    bbox: &BoundingBox,
    rng: &mut R,
) -> Result<Vec<Point>, SampleError> {
    let mut points = generate(clusters, clustered, bbox, rng)?;
    points.extend(generate_uniform(uniform, bbox, rng));
    Ok(points)
}
