//! Entity registry interface expected by the pipeline's executor.

use foundry_arena::Handle;

/// Source of the entity handle list a system tree operates over.
///
/// Implemented by whatever owns one or more [`foundry_arena::EntityContainer`]s
/// (or several, for `get_entities_of_kind`-style filtering); the pipeline
/// itself is agnostic to how handles are stored.
pub trait Registry: Send + Sync {
    /// All handles currently registered, in whatever order the registry
    /// keeps them. Serial/ordered-serial/parallel dispatch all start from
    /// this same snapshot, gathered once per system invocation.
    fn handles(&self) -> Vec<Handle>;
}

impl Registry for Vec<Handle> {
    fn handles(&self) -> Vec<Handle> {
        self.clone()
    }
}
