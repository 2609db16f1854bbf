//! Behavior-tree-style flow control: sub-tree call stacks, per-depth node
//! state, and deterministic tick semantics.
//!
//! A [`FlowTree`] is a named graph of [`NodeKind`] nodes assembled with
//! [`FlowBuilder`] and driven one tick at a time by [`FlowTree::tick`].
//! Composite and decorator nodes (`Sequence`, `Retry`, `Timeout`, ...)
//! resume exactly where they left off across ticks via a per-depth state
//! table; `SubTree` nodes let one tree descend into another (including
//! itself, for recursive trees) with a call-stack depth bound shared
//! across the whole `tick()` call, however many trees it passes through.
//!
//! Stochastic node kinds (`RandomSelector`, `ShuffledSelector`,
//! `WeightedRandomSelector`) draw from a per-tree seeded RNG so that a
//! tree constructed with the same seed ticks identically every run.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod builder;
mod callbacks;
mod callstack;
mod error;
mod node;
mod state;
mod status;
mod tree;

pub use builder::FlowBuilder;
pub use callbacks::{ActionFn, ConditionFn, DynamicTreeProvider, ScopeEnterFn, ScopeExitFn, StateProvider};
pub use error::FlowError;
pub use node::{NodeId, NodeKind, ParallelPolicy, SubTreeSpec};
pub use state::{new_state, FlowState, StateRef};
pub use status::Status;
pub use tree::{FlowTree, DEFAULT_MAX_CALL_DEPTH};
