//! The register store: the single authority over all named register arrays.
//!
//! # Thread Safety
//!
//! The name mapping sits behind an async `RwLock`, and every entry has its own
//! `RwLock`. Create and delete take the mapping exclusively; reads and writes
//! take it shared and then lock only the addressed entry, so writes to
//! different arrays do not wait on each other and a reader never observes a
//! half-applied write.

mod array;

pub use array::{RegisterArray, RegisterArraySnapshot};

use crate::error::{RegisterError, Result};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Owned, synchronized mapping from array name to register array.
#[derive(Debug, Default)]
pub struct RegisterStore {
    arrays: RwLock<BTreeMap<String, RwLock<RegisterArray>>>,
}

impl RegisterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a zeroed array of `capacity` slots under `name`.
    ///
    /// Fails with `AlreadyExists` if the name is live; the existing array is
    /// not touched. A capacity the process cannot allocate is rejected and
    /// nothing is inserted.
    pub async fn create(&self, name: &str, capacity: u32) -> Result<()> {
        let mut arrays = self.arrays.write().await;
        match arrays.entry(name.to_string()) {
            Entry::Occupied(_) => Err(RegisterError::already_exists(name)),
            Entry::Vacant(slot) => {
                slot.insert(RwLock::new(RegisterArray::new(name, capacity)?));
                debug!("Created register array {} with capacity {}", name, capacity);
                Ok(())
            }
        }
    }

    /// Remove `name` together with its write tracking.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut arrays = self.arrays.write().await;
        match arrays.remove(name) {
            Some(_) => {
                debug!("Deleted register array {}", name);
                Ok(())
            }
            None => Err(RegisterError::not_found(name)),
        }
    }

    /// Snapshot of a single array.
    pub async fn get(&self, name: &str) -> Result<RegisterArraySnapshot> {
        let arrays = self.arrays.read().await;
        let entry = arrays
            .get(name)
            .ok_or_else(|| RegisterError::not_found(name))?;
        let snapshot = entry.read().await.snapshot();
        Ok(snapshot)
    }

    /// Snapshots of every array, in lexicographic name order.
    pub async fn get_all(&self) -> Vec<RegisterArraySnapshot> {
        let arrays = self.arrays.read().await;
        let mut snapshots = Vec::with_capacity(arrays.len());
        for entry in arrays.values() {
            snapshots.push(entry.read().await.snapshot());
        }
        snapshots
    }

    /// Read one slot. The bound is capacity, so unwritten slots read as zero.
    pub async fn read_item(&self, name: &str, index: u32) -> Result<u32> {
        let arrays = self.arrays.read().await;
        let entry = arrays
            .get(name)
            .ok_or_else(|| RegisterError::not_found(name))?;
        let value = entry.read().await.read(index)?;
        Ok(value)
    }

    /// Write one slot, counting the index toward `size` on its first write.
    pub async fn write_item(&self, name: &str, index: u32, value: u32) -> Result<()> {
        let arrays = self.arrays.read().await;
        let entry = arrays
            .get(name)
            .ok_or_else(|| RegisterError::not_found(name))?;
        let first_write = entry.write().await.write(index, value)?;
        debug!(
            "Wrote {}[{}] = {} (first write: {})",
            name, index, value, first_write
        );
        Ok(())
    }

    /// Number of live arrays.
    pub async fn len(&self) -> usize {
        self.arrays.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.arrays.read().await.is_empty()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.arrays.read().await.contains_key(name)
    }
}
