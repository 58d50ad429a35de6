//! Marker table: remembered offsets that survive buffer compaction.
//!
//! The scanner pushes a marker when it needs to remember a position inside
//! a pending token (where a heading's text starts, where a link's `|` sits).
//! When the driver compacts the buffer every live marker is rebased onto the
//! new origin, so distances between markers and the token start are kept.

use wikiparse_core::ErrorCode;

/// Default number of marker slots.
pub const MARKER_SLOTS: usize = 32;

/// Index of a pushed marker.
pub(crate) type Slot = usize;

/// Fixed-size stack of optional buffer offsets.
#[derive(Debug, Clone)]
pub(crate) struct MarkerTable {
    slots: Box<[Option<usize>]>,
    top: usize,
}

impl MarkerTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            top: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Remember `offset`, failing when every slot is taken.
    pub fn push(&mut self, offset: usize) -> Result<Slot, ErrorCode> {
        let slot = self.top;
        let entry = self.slots.get_mut(slot).ok_or(ErrorCode::MarkerStack)?;
        *entry = Some(offset);
        self.top += 1;
        Ok(slot)
    }

    pub fn get(&self, slot: Slot) -> Option<usize> {
        self.slots.get(slot).copied().flatten()
    }

    /// Release every marker above the first `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.top {
            return;
        }
        for entry in &mut self.slots[len..self.top] {
            *entry = None;
        }
        self.top = len;
    }

    /// Release every marker.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Rebase every live marker so that `origin` becomes offset zero.
    ///
    /// Markers never point before the pending token start, which is always
    /// the origin chosen by the driver.
    pub fn relocate(&mut self, origin: usize) {
        for offset in self.slots.iter_mut().flatten() {
            debug_assert!(*offset >= origin);
            *offset -= origin;
        }
    }
}
