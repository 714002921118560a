//! Live GPU handle accounting.
//!
//! GPU buffers and textures are released by hand on model teardown. The
//! ledger records every handle a backend creates so a swap can be checked to
//! leave exactly the new model's handles alive.

use crate::error::{Result, ViewerError};
use fnv::FnvHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl ResourceCounts {
    pub fn total(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

#[derive(Debug, Default)]
pub struct ResourceLedger {
    next: u64,
    live: FnvHashMap<ResourceId, ResourceKind>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ResourceKind) -> ResourceId {
        self.next += 1;
        let id = ResourceId(self.next);
        self.live.insert(id, kind);
        id
    }

    /// Returns `false` if the handle was unknown or already released.
    pub fn release(&mut self, id: ResourceId) -> bool {
        if self.live.remove(&id).is_none() {
            log::warn!("[resources] double release of {:?}", id);
            return false;
        }
        true
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn counts(&self) -> ResourceCounts {
        let mut c = ResourceCounts::default();
        for kind in self.live.values() {
            match kind {
                ResourceKind::Geometry => c.geometries += 1,
                ResourceKind::Material => c.materials += 1,
                ResourceKind::Texture => c.textures += 1,
            }
        }
        c
    }
}

/// Reject textures the device cannot allocate before any upload starts.
pub fn ensure_texture_fits(width: u32, height: u32, max_dim: u32) -> Result<()> {
    if width > max_dim || height > max_dim {
        return Err(ViewerError::TextureTooLarge {
            width,
            height,
            max: max_dim,
        });
    }
    Ok(())
}
