//! Generational slot pool.
//!
//! Allocation never reuses a stale `(index, generation)` pair: each slot
//! carries a generation counter that only moves forward, and generation
//! `0` is reserved to mean "never valid". See `DESIGN.md` for the two
//! open-question decisions this implementation makes (spawn-panic
//! reclamation, generation-bump timing).

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::error::ArenaError;

/// Maximum capacity an arena will grow to. Doubling stops here; a request
/// that would need more fails with [`ArenaError::CapacityExceeded`].
const MAX_CAPACITY: usize = 1 << 30;

const INITIAL_CAPACITY: usize = 16;

struct Slot<E> {
    entity: Option<E>,
    generation: u32,
}

impl<E> Slot<E> {
    fn empty() -> Self {
        Slot { entity: None, generation: 0 }
    }
}

struct ArenaInner<E> {
    slots: Vec<Slot<E>>,
    /// LIFO stack of indices available for reuse.
    free_list: Vec<usize>,
    /// Number of slots never yet touched, at the tail of `slots`.
    high_watermark: usize,
    count: usize,
}

impl<E> ArenaInner<E> {
    fn new() -> Self {
        let mut slots = Vec::with_capacity(INITIAL_CAPACITY);
        slots.resize_with(INITIAL_CAPACITY, Slot::empty);
        ArenaInner { slots, free_list: Vec::new(), high_watermark: 0, count: 0 }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn free_count(&self) -> usize {
        self.free_list.len() + (self.capacity() - self.high_watermark)
    }

    fn grow(&mut self) -> Result<(), ArenaError> {
        let new_capacity = self.capacity() * 2;
        if new_capacity > MAX_CAPACITY {
            return Err(ArenaError::CapacityExceeded {
                requested: new_capacity,
                limit: MAX_CAPACITY,
            });
        }
        self.slots.resize_with(new_capacity, Slot::empty);
        Ok(())
    }

    fn next_generation(current: u32) -> u32 {
        let next = current.wrapping_add(1);
        if next == 0 {
            1
        } else {
            next
        }
    }

    fn is_valid(&self, index: usize, generation: u32) -> bool {
        if generation == 0 || index >= self.slots.len() {
            return false;
        }
        let slot = &self.slots[index];
        slot.generation == generation && slot.entity.is_some()
    }
}

/// A slot-reusing pool of heap-allocated records of type `E`.
///
/// All operations serialize through an internal [`Mutex`], satisfying the
/// "operations under an exclusive lock" requirement even though a single
/// caller thread is the common case.
pub struct Arena<E> {
    inner: Mutex<ArenaInner<E>>,
}

impl<E> Default for Arena<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Arena<E> {
    /// Create an empty arena with a small initial capacity.
    pub fn new() -> Self {
        Arena { inner: Mutex::new(ArenaInner::new()) }
    }

    /// Number of live entities.
    pub fn count(&self) -> usize {
        self.inner.lock().expect("arena mutex poisoned").count
    }

    /// Current capacity (`count + free_count <= capacity` always holds).
    pub fn capacity(&self) -> usize {
        self.inner.lock().expect("arena mutex poisoned").capacity()
    }

    /// Number of slots that are not currently live.
    pub fn free_count(&self) -> usize {
        self.inner.lock().expect("arena mutex poisoned").free_count()
    }

    /// Allocate a new slot, construct its entity via `E::default()`, invoke
    /// `spawn` with a mutable reference to it, and return the new handle
    /// components.
    ///
    /// If `spawn` panics, the slot is reclaimed onto the free list before
    /// the panic resumes unwinding (Open Question 1: reclaim-on-throw is
    /// the safer contract — a spawn that never completes should not leak
    /// a permanently-allocated, unreachable slot).
    pub fn allocate(&self, spawn: impl FnOnce(&mut E)) -> Result<(usize, u32), ArenaError>
    where
        E: Default,
    {
        let mut inner = self.inner.lock().expect("arena mutex poisoned");
        let index = if let Some(index) = inner.free_list.pop() {
            index
        } else {
            if inner.high_watermark == inner.capacity() {
                inner.grow()?;
            }
            let index = inner.high_watermark;
            inner.high_watermark += 1;
            index
        };
        let slot = &mut inner.slots[index];
        slot.generation = ArenaInner::<E>::next_generation(slot.generation);
        slot.entity = Some(E::default());
        inner.count += 1;

        let entity = inner.slots[index].entity.as_mut().expect("just allocated");
        match panic::catch_unwind(AssertUnwindSafe(|| spawn(entity))) {
            Ok(()) => {
                let generation = inner.slots[index].generation;
                Ok((index, generation))
            }
            Err(payload) => {
                inner.slots[index].entity = None;
                inner.count -= 1;
                inner.free_list.push(index);
                drop(inner);
                panic::resume_unwind(payload);
            }
        }
    }

    /// Deallocate `(index, generation)`. Invokes `despawn` with a mutable
    /// reference to the entity before removing it. Returns `false` (a
    /// no-op) if the handle is not currently valid.
    ///
    /// Generation is *not* incremented here (Open Question 2): the next
    /// `allocate` of this slot bumps it, which is sufficient to
    /// invalidate every handle issued against the old generation.
    pub fn deallocate(&self, index: usize, generation: u32, despawn: impl FnOnce(&mut E)) -> bool {
        let mut inner = self.inner.lock().expect("arena mutex poisoned");
        if !inner.is_valid(index, generation) {
            return false;
        }
        {
            let slot = &mut inner.slots[index];
            let entity = slot.entity.as_mut().expect("validated live");
            despawn(entity);
            slot.entity = None;
        }
        inner.count -= 1;
        inner.free_list.push(index);
        true
    }

    /// Check `(index, generation)` validity: in bounds, generation
    /// positive, matching the slot's current generation, and the slot is
    /// live.
    pub fn is_valid(&self, index: usize, generation: u32) -> bool {
        self.inner.lock().expect("arena mutex poisoned").is_valid(index, generation)
    }

    /// Run `f` with a mutable reference to the entity at `(index,
    /// generation)`, or return `None` if the handle is stale.
    pub fn try_get_mut<R>(&self, index: usize, generation: u32, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        let mut inner = self.inner.lock().expect("arena mutex poisoned");
        if !inner.is_valid(index, generation) {
            return None;
        }
        let slot = &mut inner.slots[index];
        Some(f(slot.entity.as_mut().expect("validated live")))
    }

    /// Run `f` with a shared reference to the entity at `(index,
    /// generation)`, or return `None` if the handle is stale.
    pub fn try_get<R>(&self, index: usize, generation: u32, f: impl FnOnce(&E) -> R) -> Option<R> {
        let inner = self.inner.lock().expect("arena mutex poisoned");
        if !inner.is_valid(index, generation) {
            return None;
        }
        let slot = &inner.slots[index];
        Some(f(slot.entity.as_ref().expect("validated live")))
    }
}

/// Object-safe validity check implemented by every [`Arena<E>`], used by
/// the type-erased [`crate::handle::Handle`].
pub trait AnyArena: Any + Send + Sync {
    /// Check `(index, generation)` validity without knowing the concrete
    /// entity type.
    fn is_valid(&self, index: usize, generation: u32) -> bool;
}

impl<E: Send + Sync + 'static> AnyArena for Arena<E> {
    fn is_valid(&self, index: usize, generation: u32) -> bool {
        Arena::is_valid(self, index, generation)
    }
}

impl dyn AnyArena {
    /// Attempt to recover a `&Arena<E>` from a type-erased reference.
    /// Returns `None` without panicking if `E` does not match the
    /// concrete arena kind.
    pub fn downcast_ref<E: Send + Sync + 'static>(&self) -> Option<&Arena<E>> {
        (self as &dyn Any).downcast_ref::<Arena<E>>()
    }
}

/// Reference-counted handle to a type-erased arena, for use inside
/// [`crate::handle::Handle`]. Cloning is cheap (atomic refcount bump);
/// equality between two `ArenaRef`s is pointer identity, never structural.
pub type ArenaRef = Arc<dyn AnyArena>;
