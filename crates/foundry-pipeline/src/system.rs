//! System capability traits and the closed set of dispatchable node kinds.

use foundry_arena::Handle;

use crate::context::SystemContext;
use crate::group::SystemGroup;
use crate::registry::Registry;

/// A system that processes the whole handle list in one synchronous call
/// on the calling thread.
pub trait SerialSystem: Send + Sync {
    /// Diagnostic name, used in error messages.
    fn name(&self) -> &str;

    /// Skipped entirely when `false`.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Process every handle. Effects are visible to later systems in the
    /// same serial group before they run.
    fn process_serial(&mut self, registry: &dyn Registry, handles: &[Handle], context: &SystemContext);
}

/// A system whose per-entity work the executor distributes across a
/// worker pool. No ordering is guaranteed between entities; the system
/// must poll `context.is_cancelled()` and return early when set.
pub trait ParallelSystem: Send + Sync {
    /// Diagnostic name, used in error messages.
    fn name(&self) -> &str;

    /// Skipped entirely when `false`.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Process a single entity. Called concurrently from multiple
    /// worker threads with distinct handles; shared mutable state must be
    /// synchronized by the implementation.
    fn process_entity(&self, registry: &dyn Registry, handle: &Handle, context: &SystemContext);
}

/// A system that first computes an ordering (or subset) of the handle
/// list, then processes the result serially.
pub trait OrderedSerialSystem: Send + Sync {
    /// Diagnostic name, used in error messages.
    fn name(&self) -> &str;

    /// Skipped entirely when `false`.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Fill `output` with a permutation or subset of `input`. Must run to
    /// completion before [`OrderedSerialSystem::process_serial`] is
    /// called.
    fn order_entities(&self, input: &[Handle], output: &mut Vec<Handle>);

    /// Process the ordered/filtered list built by `order_entities`.
    fn process_serial(&mut self, registry: &dyn Registry, ordered: &[Handle], context: &SystemContext);
}

/// One dispatchable unit in a system tree: a leaf system of one of the
/// three known kinds, a nested group, or an explicitly-unrecognized kind.
///
/// The `Unknown` variant is how a system descriptor built from a kind tag
/// the executor doesn't recognize becomes constructible at all — every
/// other variant is statically known-good by construction, so without it
/// `PipelineError::UnknownSystemKind` would be unreachable dead code.
pub enum SystemNode {
    /// A serial leaf system.
    Serial(Box<dyn SerialSystem>),
    /// A parallel leaf system.
    Parallel(Box<dyn ParallelSystem>),
    /// An ordered-serial leaf system.
    OrderedSerial(Box<dyn OrderedSerialSystem>),
    /// A nested group (serial or parallel over its own children).
    Group(SystemGroup),
    /// A node whose kind the executor cannot dispatch.
    Unknown {
        /// Diagnostic name for the offending node.
        name: String,
    },
}

impl SystemNode {
    /// Diagnostic name of the wrapped system or group.
    pub fn name(&self) -> &str {
        match self {
            SystemNode::Serial(s) => s.name(),
            SystemNode::Parallel(s) => s.name(),
            SystemNode::OrderedSerial(s) => s.name(),
            SystemNode::Group(g) => g.name(),
            SystemNode::Unknown { name } => name,
        }
    }
}
