//! Callback type aliases shared by `Action`/`Condition`/`Guard`/`Scope`
//! leaves and decorators, and by `SubTree` providers.
//!
//! Every callback is reference-counted (`Rc`) rather than boxed outright
//! so a node's `NodeKind` can be cheaply cloned out of the tree's node
//! table for the duration of one `tick_node` call (see `tree.rs`) without
//! re-allocating the closure itself.

use std::rc::Rc;

use crate::state::StateRef;
use crate::status::Status;
use crate::tree::FlowTree;

/// `Action(fn)`: returns the node's terminal/running status directly.
pub type ActionFn = Rc<dyn Fn(Option<&StateRef>) -> Status>;

/// `Condition(fn)`, `Guard(cond, ...)`, `WaitUntil(cond, ...)`: a boolean
/// predicate over the state.
pub type ConditionFn = Rc<dyn Fn(Option<&StateRef>) -> bool>;

/// `Scope(on_enter, ...)`: fired once at first entry to a depth.
pub type ScopeEnterFn = Rc<dyn Fn(Option<&StateRef>)>;

/// `Scope(..., on_exit, ...)`: fired once when the scoped child reaches a
/// terminal status.
pub type ScopeExitFn = Rc<dyn Fn(Option<&StateRef>, Status)>;

/// `SubTree` dynamic/state-injecting variants: resolves which tree to
/// descend into, evaluated once per fresh entry to a depth.
pub type DynamicTreeProvider = Rc<dyn Fn(Option<&StateRef>) -> Option<FlowTree>>;

/// `SubTree` state-injecting variant: builds the child state from the
/// caller's state. The node sets `child.parent` itself after calling this.
pub type StateProvider = Rc<dyn Fn(Option<&StateRef>) -> StateRef>;
