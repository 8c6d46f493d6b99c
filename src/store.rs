//! store.rs
//! The device store the aggregation pipeline reads from. Storage itself is
//! an external collaborator; the service only needs "read all points" and
//! "append points", so that is the whole seam. The bundled implementation
//! keeps everything in memory.

use std::sync::RwLock;

use thiserror::Error;

use crate::types::Point;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Read or write against the backing store failed. Propagated to the
    /// caller as-is; retrying is the store client's business, not ours.
    #[error("device store unavailable: {0}")]
    Unavailable(String),
}

pub trait DeviceStore: Send + Sync {
    fn list_points(&self) -> Result<Vec<Point>, StoreError>;
    fn append_points(&self, points: &[Point]) -> Result<(), StoreError>;
}

/// In-memory store. A poisoned lock (a panic while holding the guard)
/// surfaces as `Unavailable` rather than cascading the panic.
#[derive(Default)]
pub struct MemStore {
    points: RwLock<Vec<Point>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemStore {
    fn list_points(&self) -> Result<Vec<Point>, StoreError> {
        let guard = self
            .points
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(guard.clone())
    }

    fn append_points(&self, points: &[Point]) -> Result<(), StoreError> {
        let mut guard = self
            .points
            .write()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        guard.extend_from_slice(points);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_then_list_round_trips() {
        let store = MemStore::new();
        assert!(store.list_points().unwrap().is_empty());

        let batch = vec![Point::new(35.3079, -80.7335), Point::new(35.3090, -80.7352)];
        store.append_points(&batch).unwrap();
        store.append_points(&[Point::new(35.3086, -80.7350)]).unwrap();

        let all = store.list_points().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], batch[0]);
    }

    #[test]
    fn listing_does_not_drain_the_store() {
        let store = MemStore::new();
        store.append_points(&[Point::new(35.3079, -80.7335)]).unwrap();
        assert_eq!(store.list_points().unwrap().len(), 1);
        assert_eq!(store.list_points().unwrap().len(), 1);
    }
}
