//! Named collections of fences.
//!
//! Useful when several independent data sets must be searched side by side.
//! [`FenceRegistry`] is the thread-safe form; [`FenceTable`] is the plain map
//! it guards, for single-threaded embedding.

use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::{FenceError, Result};
use crate::fence::{Fence, GeoFence};
use crate::models::{Coordinate, Feature};

/// Unsynchronized name -> fence map
#[derive(Default)]
pub struct FenceTable {
    fences: HashMap<String, Fence>,
}

impl FenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fence, replacing any fence previously stored under `name`
    pub fn set(&mut self, name: impl Into<String>, fence: Fence) {
        self.fences.insert(name.into(), fence);
    }

    pub fn get(&self, name: &str) -> Option<&Fence> {
        self.fences.get(name)
    }

    /// Add a feature to the fence at `name`
    pub fn add(&mut self, name: &str, feature: Arc<Feature>) -> Result<()> {
        let fence = self
            .fences
            .get_mut(name)
            .ok_or_else(|| FenceError::NameNotFound(name.to_string()))?;
        fence.add(feature);
        Ok(())
    }

    /// Search the fence at `name` for features containing the coordinate
    pub fn search(&self, name: &str, coordinate: Coordinate) -> Result<Vec<Arc<Feature>>> {
        let fence = self
            .fences
            .get(name)
            .ok_or_else(|| FenceError::NameNotFound(name.to_string()))?;
        Ok(fence.get(coordinate))
    }

    /// Names of the installed fences, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.fences.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }
}

/// Thread-safe registry of named fences.
///
/// Searches share a read lock; installing a fence or adding a feature takes
/// the write lock. Fences are built before [`FenceRegistry::set`], so readers
/// see either the old or the new fence, never a partial one.
#[derive(Default)]
pub struct FenceRegistry {
    table: RwLock<FenceTable>,
}

impl FenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: impl Into<String>, fence: Fence) {
        self.table.write().set(name, fence);
    }

    /// Index a feature under the write lock, which blocks searches on every
    /// name while it runs. For bulk loads build the fence first and install it
    /// with [`FenceRegistry::set`].
    pub fn add(&self, name: &str, feature: Arc<Feature>) -> Result<()> {
        self.table.write().add(name, feature)
    }

    pub fn search(&self, name: &str, coordinate: Coordinate) -> Result<Vec<Arc<Feature>>> {
        self.table.read().search(name, coordinate)
    }

    pub fn keys(&self) -> Vec<String> {
        self.table.read().keys()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.read().get(name).is_some()
    }

    /// Run `f` against the fence at `name` under the read lock
    pub fn with_fence<R>(&self, name: &str, f: impl FnOnce(&Fence) -> R) -> Option<R> {
        self.table.read().get(name).map(f)
    }

    pub fn len(&self) -> usize {
        self.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().is_empty()
    }

    /// Unwrap into the plain table
    pub fn into_inner(self) -> FenceTable {
        self.table.into_inner()
    }
}

impl From<FenceTable> for FenceRegistry {
    fn from(table: FenceTable) -> Self {
        Self {
            table: RwLock::new(table),
        }
    }
}
