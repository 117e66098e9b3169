//! Sparse in-memory overlay of edited records.
//!
//! The overlay maps a global index to either a replacement record or a
//! tombstone. It is consulted by identity lookups only: range listings and
//! statistics always reflect the files as indexed at startup. Nothing here
//! survives a restart.

use std::collections::HashMap;

use tracing::debug;

use crate::types::PointRecord;

/// Content of one overlay slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverlaySlot {
    Record(PointRecord),
    /// Explicitly deleted; hides any file-backed record at the same index.
    Tombstone,
}

/// Edited records keyed by global index, plus the running point count.
#[derive(Debug, Clone, Default)]
pub struct OverlayStore {
    slots: HashMap<usize, OverlaySlot>,
    total_points: usize,
}

impl OverlayStore {
    /// Start an overlay on top of `total_points` file-backed points.
    pub fn new(total_points: usize) -> Self {
        Self {
            slots: HashMap::new(),
            total_points,
        }
    }

    /// Store a new record at the next free global index and return it.
    ///
    /// The new id lies past every file's range, so the record is reachable
    /// by id lookup only.
    pub fn create(&mut self, record: PointRecord) -> usize {
        let id = self.total_points;
        self.slots.insert(id, OverlaySlot::Record(record));
        self.total_points += 1;
        debug!(id = id, "Created overlay record");
        id
    }

    /// Unconditionally overwrite the slot for `id`.
    pub fn update(&mut self, id: usize, record: PointRecord) {
        self.slots.insert(id, OverlaySlot::Record(record));
    }

    /// Unconditionally tombstone the slot for `id`.
    pub fn delete(&mut self, id: usize) {
        self.slots.insert(id, OverlaySlot::Tombstone);
    }

    /// `None` means no overlay entry: fall through to file data.
    pub fn lookup(&self, id: usize) -> Option<OverlaySlot> {
        self.slots.get(&id).copied()
    }

    /// File-backed points plus every id handed out by [`create`](Self::create).
    pub fn total_points(&self) -> usize {
        self.total_points
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
