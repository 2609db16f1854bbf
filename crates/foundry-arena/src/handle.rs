//! Type-erased handle: a non-owning, generationally-checked reference into
//! an [`crate::arena::Arena`] of unknown entity type.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::arena::{AnyArena, Arena};

/// A safe, non-owning reference into an arena: `(arena_ref, index,
/// generation)`.
///
/// Equality and hashing are structural over all three components, with
/// one deliberate exception (Open Question 6): the arena-reference
/// component compares by *pointer identity* (`Arc::ptr_eq`), never by
/// dereferencing and comparing the arenas' contents. A default-constructed
/// handle has no arena and never validates.
#[derive(Clone)]
pub struct Handle {
    arena: Option<Arc<dyn AnyArena>>,
    index: usize,
    generation: u32,
}

impl Handle {
    /// Construct a handle pointing at `(index, generation)` in `arena`.
    pub fn new(arena: Arc<dyn AnyArena>, index: usize, generation: u32) -> Self {
        Handle { arena: Some(arena), index, generation }
    }

    /// The default/invalid handle: no arena, index `0`, generation `0`.
    /// Never validates, by construction (`generation == 0`).
    pub fn invalid() -> Self {
        Handle { arena: None, index: 0, generation: 0 }
    }

    /// Slot index this handle refers to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Generation this handle was issued against.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// `true` iff an arena is present and still considers
    /// `(index, generation)` live.
    pub fn is_valid(&self) -> bool {
        match &self.arena {
            Some(arena) => arena.is_valid(self.index, self.generation),
            None => false,
        }
    }

    /// Attempt to recover a reference to the concrete, strongly-typed
    /// arena this handle was issued from. Returns `None` if this handle
    /// has no arena, or if the arena's entity type does not match `E`.
    pub fn try_as<E: Send + Sync + 'static>(&self) -> Option<&Arena<E>> {
        self.arena.as_deref()?.downcast_ref::<E>()
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::invalid()
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        let arena_eq = match (&self.arena, &other.arena) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        arena_eq && self.index == other.index && self.generation == other.generation
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.arena {
            Some(arena) => (Arc::as_ptr(arena) as *const () as usize).hash(state),
            None => 0usize.hash(state),
        }
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl std::fmt::Debug for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handle")
            .field("has_arena", &self.arena.is_some())
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;

    #[derive(Default)]
    struct Dummy;
    #[derive(Default)]
    struct Other;

    #[test]
    fn invalid_handle_never_validates() {
        assert!(!Handle::invalid().is_valid());
    }

    #[test]
    fn two_invalid_handles_are_equal() {
        assert_eq!(Handle::invalid(), Handle::invalid());
    }

    #[test]
    fn handle_valid_immediately_after_allocate() {
        let arena: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        let (index, generation) = arena.downcast_ref::<Dummy>().unwrap().allocate(|_| {}).unwrap();
        let handle = Handle::new(Arc::clone(&arena), index, generation);
        assert!(handle.is_valid());
    }

    #[test]
    fn handle_invalid_after_deallocate() {
        let arena: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        let concrete = arena.downcast_ref::<Dummy>().unwrap();
        let (index, generation) = concrete.allocate(|_| {}).unwrap();
        let handle = Handle::new(Arc::clone(&arena), index, generation);
        concrete.deallocate(index, generation, |_| {});
        assert!(!handle.is_valid());
    }

    #[test]
    fn same_index_generation_different_arena_instances_not_equal() {
        let arena_a: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        let arena_b: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        arena_a.downcast_ref::<Dummy>().unwrap().allocate(|_| {}).unwrap();
        arena_b.downcast_ref::<Dummy>().unwrap().allocate(|_| {}).unwrap();
        let h1 = Handle::new(Arc::clone(&arena_a), 0, 1);
        let h2 = Handle::new(Arc::clone(&arena_b), 0, 1);
        assert_ne!(h1, h2, "pointer-identity arena comparison must not treat distinct arenas as equal");
    }

    #[test]
    fn try_as_succeeds_for_matching_type_fails_for_mismatched_type() {
        let arena: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        let (index, generation) = arena.downcast_ref::<Dummy>().unwrap().allocate(|_| {}).unwrap();
        let handle = Handle::new(arena, index, generation);
        assert!(handle.try_as::<Dummy>().is_some());
        assert!(handle.try_as::<Other>().is_none());
    }

    #[test]
    fn handle_used_against_wrong_arena_depends_only_on_that_arena() {
        // Spatial-world-style scenario generalized to entity handles:
        // a handle's validity is determined solely by the arena it
        // actually points at, never by some other arena's state.
        let arena_a: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        let arena_b: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        let (index, generation) = arena_a.downcast_ref::<Dummy>().unwrap().allocate(|_| {}).unwrap();
        let handle = Handle::new(Arc::clone(&arena_a), index, generation);
        // arena_b never allocated index 0, so it reports not-live there,
        // but the handle points at arena_a and is unaffected.
        assert!(!arena_b.is_valid(index, generation));
        assert!(handle.is_valid());
    }
}
