//! User-supplied state objects ticked through a [`crate::tree::FlowTree`].
//!
//! A state is any type that can report/accept a parent link; `SubTree`
//! state-injection sets a child state's parent to the caller's state (spec
//! §3 "State object"). Shared, interior-mutable ownership
//! (`Rc<RefCell<dyn FlowState>>`) mirrors the single-threaded, cooperative
//! scheduling model FlowTree lives under (spec §5): a tree is never ticked
//! from two threads at once, so `Rc`/`RefCell` are the same tool the
//! teacher's single-threaded `murk-replay` journal types reach for instead
//! of `Arc`/`Mutex`.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A state object ticked through a tree: user data plus a link to the
/// parent state of whichever `SubTree` invocation (if any) produced it.
pub trait FlowState: Any {
    /// The state that invoked the sub-tree this state belongs to, if any.
    fn parent(&self) -> Option<StateRef>;

    /// Set the parent link. Called once by a state-injecting `SubTree`
    /// node immediately after constructing the child state.
    fn set_parent(&mut self, parent: Option<StateRef>);

    /// Type-erased view for downcasting back to the concrete state type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable type-erased view for downcasting back to the concrete state
    /// type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Shared handle to a state object, as held by call-stack frames and
/// `SubTree` nodes.
pub type StateRef = Rc<RefCell<dyn FlowState>>;

/// Wrap a concrete state in a fresh [`StateRef`].
pub fn new_state<S: FlowState + 'static>(state: S) -> StateRef {
    Rc::new(RefCell::new(state))
}

impl dyn FlowState {
    /// Downcast to a concrete state type, or `None` if it doesn't match.
    pub fn downcast_ref<S: FlowState>(&self) -> Option<&S> {
        self.as_any().downcast_ref::<S>()
    }

    /// Mutable downcast to a concrete state type.
    pub fn downcast_mut<S: FlowState>(&mut self) -> Option<&mut S> {
        self.as_any_mut().downcast_mut::<S>()
    }
}
