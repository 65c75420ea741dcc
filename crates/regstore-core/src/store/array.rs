//! A single named register array and its snapshot type.

use crate::error::{RegisterError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, TryReserveError};

/// One named, fixed-capacity sequence of `u32` slots.
///
/// The set of written indices lives on the array itself, so creating or
/// dropping the array creates or drops its write tracking with it.
#[derive(Debug, Clone)]
pub struct RegisterArray {
    name: String,
    items: Vec<u32>,
    written: BTreeSet<u32>,
}

impl RegisterArray {
    /// Allocate a zeroed array. A capacity of zero is valid.
    ///
    /// Fails with a validation error instead of aborting when the slots
    /// cannot be allocated.
    pub fn new(name: impl Into<String>, capacity: u32) -> Result<Self> {
        let name = name.into();
        let items = zeroed_slots(capacity as usize).map_err(|e| RegisterError::Validation {
            field: "capacity".to_string(),
            message: format!(
                "cannot allocate {} slots for register array {}: {}",
                capacity, name, e
            ),
        })?;
        Ok(Self {
            name,
            items,
            written: BTreeSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> u32 {
        // items.len() was built from a u32 and never changes
        self.items.len() as u32
    }

    /// Number of distinct indices written at least once.
    pub fn size(&self) -> u32 {
        self.written.len() as u32
    }

    pub fn items(&self) -> &[u32] {
        &self.items
    }

    fn check_index(&self, index: u32) -> Result<usize> {
        if index >= self.capacity() {
            return Err(RegisterError::OutOfRange {
                name: self.name.clone(),
                index,
                capacity: self.capacity(),
            });
        }
        Ok(index as usize)
    }

    /// Read the slot at `index`. Unwritten slots read as zero.
    pub fn read(&self, index: u32) -> Result<u32> {
        let slot = self.check_index(index)?;
        Ok(self.items[slot])
    }

    /// Overwrite the slot at `index`.
    ///
    /// Returns `true` if this was the first write to `index`. On error the
    /// array is left untouched.
    pub fn write(&mut self, index: u32, value: u32) -> Result<bool> {
        let slot = self.check_index(index)?;
        self.items[slot] = value;
        Ok(self.written.insert(index))
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> RegisterArraySnapshot {
        RegisterArraySnapshot {
            name: self.name.clone(),
            capacity: self.capacity(),
            size: self.size(),
            items: self.items.clone(),
        }
    }
}

fn zeroed_slots(len: usize) -> std::result::Result<Vec<u32>, TryReserveError> {
    let mut items = Vec::new();
    items.try_reserve_exact(len)?;
    items.resize(len, 0);
    Ok(items)
}

/// Immutable copy of a register array returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterArraySnapshot {
    pub name: String,
    pub capacity: u32,
    pub size: u32,
    pub items: Vec<u32>,
}
