//! Composite system groups: serial (textual-order, synchronous) and
//! parallel (fan out, join before returning), nestable arbitrarily.

use crate::system::SystemNode;

/// Execution policy for a [`SystemGroup`]'s children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
    /// Children run in registration order on the calling thread; effects
    /// of child N are visible to child N+1.
    Serial,
    /// Children may run concurrently; no ordering guarantee; the group
    /// completes only once every child has completed (or cancellation
    /// propagates).
    Parallel,
}

/// A named, orderable set of child [`SystemNode`]s. Groups satisfy the
/// same dispatch contract as leaf systems, so serial-of-parallel-of-serial
/// (and any other nesting) works without special-casing.
pub struct SystemGroup {
    name: String,
    mode: GroupMode,
    enabled: bool,
    children: Vec<SystemNode>,
}

impl SystemGroup {
    /// Construct an empty group with the given dispatch policy.
    pub fn new(name: impl Into<String>, mode: GroupMode) -> Self {
        SystemGroup { name: name.into(), mode, enabled: true, children: Vec::new() }
    }

    /// Append a child node in registration order.
    pub fn push(&mut self, node: SystemNode) -> &mut Self {
        self.children.push(node);
        self
    }

    /// Group name, used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// This group's dispatch policy.
    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    /// `true` unless explicitly disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disable or re-enable this group. A disabled group skips every
    /// child unconditionally, without evaluating their individual
    /// `is_enabled`.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Children in registration order.
    pub fn children(&self) -> &[SystemNode] {
        &self.children
    }

    /// Mutable access to children, for the executor's dispatch loop.
    pub fn children_mut(&mut self) -> &mut [SystemNode] {
        &mut self.children
    }
}
