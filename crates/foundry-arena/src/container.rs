//! Append-only, insertion-ordered list of handles with free-slot reuse and
//! striped iteration.

use crate::handle::Handle;

/// An insertion-ordered sequence of [`Handle`]s that tracks the lowest
/// known invalidated slot (the "free hint") so a later `add` can overwrite
/// it instead of growing.
pub struct EntityContainer {
    entries: Vec<Handle>,
    free_hint: Option<usize>,
}

impl EntityContainer {
    /// An empty container.
    pub fn new() -> Self {
        EntityContainer { entries: Vec::new(), free_hint: None }
    }

    /// Number of appended entries (including any currently-invalid ones),
    /// i.e. the length of the backing list, not the live count.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Insert `handle`. If the free hint points at a slot whose current
    /// occupant is invalid, that slot is overwritten and the hint advances
    /// past it; otherwise `handle` is appended.
    pub fn add(&mut self, handle: Handle) {
        if let Some(hint) = self.free_hint {
            if hint < self.entries.len() && !self.entries[hint].is_valid() {
                self.entries[hint] = handle;
                self.advance_hint_from(hint + 1);
                return;
            }
            // Hint stale (already reused or out of range) — clear it and
            // fall through to append.
            self.free_hint = None;
        }
        self.entries.push(handle);
    }

    /// Handle at index `i`, if present.
    pub fn get(&self, i: usize) -> Option<&Handle> {
        self.entries.get(i)
    }

    /// Move the free hint forward to the next invalid slot at or after
    /// `from`, or clear it if none remain.
    fn advance_hint_from(&mut self, from: usize) {
        self.free_hint = (from..self.entries.len()).find(|&i| !self.entries[i].is_valid());
    }

    /// Iterate indices `offset, offset + (skip + 1), offset + 2*(skip + 1),
    /// …`, yielding only the handles that are currently valid. Any invalid
    /// handle visited along the way updates the free hint to the lowest
    /// such index seen (across the whole traversal, via the iterator's
    /// `Drop`… concretely: eagerly, as this is not a lazy iterator type).
    ///
    /// With `skip = 0, offset = 0` this visits every entry.
    pub fn iterate(&mut self, skip: usize, offset: usize) -> Vec<Handle> {
        let stride = skip + 1;
        let mut out = Vec::new();
        let mut lowest_invalid: Option<usize> = None;
        let mut i = offset;
        while i < self.entries.len() {
            if self.entries[i].is_valid() {
                out.push(self.entries[i].clone());
            } else if lowest_invalid.is_none() {
                lowest_invalid = Some(i);
            }
            i += stride;
        }
        if let Some(hint) = lowest_invalid {
            self.free_hint = Some(match self.free_hint {
                Some(existing) => existing.min(hint),
                None => hint,
            });
        }
        out
    }
}

impl Default for EntityContainer {
    fn default() -> Self {
        EntityContainer::new()
    }
}
