//! A stack-of-scopes DSL for assembling a [`FlowTree`]'s node graph.
//!
//! Composite/decorator calls (`sequence()`, `retry(n)`, ...) open a scope;
//! leaf calls (`action(f)`, `success()`, ...) and nested scopes append a
//! child to whichever scope is currently open (or, if none is, become the
//! tree's root outright — a single `action(...)` with no surrounding
//! scope is a complete, if trivial, tree). `end()` closes the innermost
//! open scope and attaches it as a child of its enclosing scope, if any.

use std::rc::Rc;

use foundry_core::TickCount;

use crate::callbacks::{ActionFn, ConditionFn, DynamicTreeProvider, ScopeEnterFn, ScopeExitFn, StateProvider};
use crate::error::FlowError;
use crate::node::{NodeId, NodeKind, ParallelPolicy, SubTreeSpec};
use crate::status::Status;
use crate::tree::FlowTree;

enum ScopeKind {
    Sequence,
    Selector,
    Parallel(ParallelPolicy),
    Race,
    Join(ParallelPolicy),
    RandomSelector,
    ShuffledSelector,
    WeightedRandomSelector,
    RoundRobin,
    Inverter,
    Succeeder,
    Failer,
    Repeat(u32),
    RepeatUntilFail,
    RepeatUntilSuccess,
    Retry(u32),
    Timeout(TickCount),
    Delay(TickCount),
    Guard(ConditionFn),
    Scope(Option<ScopeEnterFn>, Option<ScopeExitFn>),
}

struct ScopeFrame {
    kind: ScopeKind,
    children: Vec<NodeId>,
    weights: Vec<u32>,
    pending_weight: Option<u32>,
}

impl ScopeFrame {
    fn new(kind: ScopeKind) -> Self {
        ScopeFrame { kind, children: Vec::new(), weights: Vec::new(), pending_weight: None }
    }
}

/// Builds one [`FlowTree`]'s node graph via a chained scope DSL.
pub struct FlowBuilder {
    tree: FlowTree,
    stack: Vec<ScopeFrame>,
    root: Option<NodeId>,
}

impl FlowBuilder {
    pub(crate) fn new(tree: FlowTree) -> Self {
        FlowBuilder { tree, stack: Vec::new(), root: None }
    }

    fn attach(&mut self, id: NodeId) -> &mut Self {
        match self.stack.last_mut() {
            Some(frame) => {
                frame.children.push(id);
                if matches!(frame.kind, ScopeKind::WeightedRandomSelector) {
                    frame.weights.push(frame.pending_weight.take().unwrap_or(1));
                }
            }
            None => self.root = Some(id),
        }
        self
    }

    fn push_leaf(&mut self, kind: NodeKind) -> &mut Self {
        let id = self.tree.push_node(kind);
        self.attach(id)
    }

    fn open(&mut self, kind: ScopeKind) -> &mut Self {
        self.stack.push(ScopeFrame::new(kind));
        self
    }

    /// Set the weight for the next child added within an enclosing
    /// `weighted_random_selector()` scope (default `1` if never called).
    pub fn weight(&mut self, w: u32) -> &mut Self {
        if let Some(frame) = self.stack.last_mut() {
            frame.pending_weight = Some(w);
        }
        self
    }

    /// Close the innermost open scope, attaching it to the scope that
    /// encloses it (or setting it as this tree's root, if none does).
    pub fn end(&mut self) -> &mut Self {
        let frame = self.stack.pop().expect("end() called with no open scope");
        let kind = match frame.kind {
            ScopeKind::Sequence => NodeKind::Sequence(frame.children),
            ScopeKind::Selector => NodeKind::Selector(frame.children),
            ScopeKind::Parallel(p) => NodeKind::Parallel(p, frame.children),
            ScopeKind::Race => NodeKind::Race(frame.children),
            ScopeKind::Join(p) => NodeKind::Join(p, frame.children),
            ScopeKind::RandomSelector => NodeKind::RandomSelector(frame.children),
            ScopeKind::ShuffledSelector => NodeKind::ShuffledSelector(frame.children),
            ScopeKind::WeightedRandomSelector => {
                NodeKind::WeightedRandomSelector(frame.weights.into_iter().zip(frame.children).collect())
            }
            ScopeKind::RoundRobin => NodeKind::RoundRobin(frame.children),
            ScopeKind::Inverter => NodeKind::Inverter(only_child(frame.children)),
            ScopeKind::Succeeder => NodeKind::Succeeder(only_child(frame.children)),
            ScopeKind::Failer => NodeKind::Failer(only_child(frame.children)),
            ScopeKind::Repeat(n) => NodeKind::Repeat(n, only_child(frame.children)),
            ScopeKind::RepeatUntilFail => NodeKind::RepeatUntilFail(only_child(frame.children)),
            ScopeKind::RepeatUntilSuccess => NodeKind::RepeatUntilSuccess(only_child(frame.children)),
            ScopeKind::Retry(n) => NodeKind::Retry(n, only_child(frame.children)),
            ScopeKind::Timeout(d) => NodeKind::Timeout(d, only_child(frame.children)),
            ScopeKind::Delay(d) => NodeKind::Delay(d, only_child(frame.children)),
            ScopeKind::Guard(c) => NodeKind::Guard(c, only_child(frame.children)),
            ScopeKind::Scope(enter, exit) => NodeKind::Scope(enter, exit, only_child(frame.children)),
        };
        self.push_leaf(kind)
    }

    // -- composites --

    /// Open a `Sequence` scope.
    pub fn sequence(&mut self) -> &mut Self {
        self.open(ScopeKind::Sequence)
    }

    /// Open a `Selector` scope.
    pub fn selector(&mut self) -> &mut Self {
        self.open(ScopeKind::Selector)
    }

    /// Open a `Parallel` scope under the given policy.
    pub fn parallel(&mut self, policy: ParallelPolicy) -> &mut Self {
        self.open(ScopeKind::Parallel(policy))
    }

    /// Open a `Race` scope.
    pub fn race(&mut self) -> &mut Self {
        self.open(ScopeKind::Race)
    }

    /// Open a `Join` scope under the given policy.
    pub fn join(&mut self, policy: ParallelPolicy) -> &mut Self {
        self.open(ScopeKind::Join(policy))
    }

    /// Open a `RandomSelector` scope.
    pub fn random_selector(&mut self) -> &mut Self {
        self.open(ScopeKind::RandomSelector)
    }

    /// Open a `ShuffledSelector` scope.
    pub fn shuffled_selector(&mut self) -> &mut Self {
        self.open(ScopeKind::ShuffledSelector)
    }

    /// Open a `WeightedRandomSelector` scope. Use [`FlowBuilder::weight`]
    /// before each child to set its weight (default `1`).
    pub fn weighted_random_selector(&mut self) -> &mut Self {
        self.open(ScopeKind::WeightedRandomSelector)
    }

    /// Open a `RoundRobin` scope.
    pub fn round_robin(&mut self) -> &mut Self {
        self.open(ScopeKind::RoundRobin)
    }

    // -- decorators --

    /// Open an `Inverter` scope (exactly one child).
    pub fn inverter(&mut self) -> &mut Self {
        self.open(ScopeKind::Inverter)
    }

    /// Open a `Succeeder` scope (exactly one child).
    pub fn succeeder(&mut self) -> &mut Self {
        self.open(ScopeKind::Succeeder)
    }

    /// Open a `Failer` scope (exactly one child).
    pub fn failer(&mut self) -> &mut Self {
        self.open(ScopeKind::Failer)
    }

    /// Open a `Repeat(n)` scope (exactly one child).
    pub fn repeat(&mut self, n: u32) -> &mut Self {
        self.open(ScopeKind::Repeat(n))
    }

    /// Open a `RepeatUntilFail` scope (exactly one child).
    pub fn repeat_until_fail(&mut self) -> &mut Self {
        self.open(ScopeKind::RepeatUntilFail)
    }

    /// Open a `RepeatUntilSuccess` scope (exactly one child).
    pub fn repeat_until_success(&mut self) -> &mut Self {
        self.open(ScopeKind::RepeatUntilSuccess)
    }

    /// Open a `Retry(n)` scope (exactly one child).
    pub fn retry(&mut self, n: u32) -> &mut Self {
        self.open(ScopeKind::Retry(n))
    }

    /// Open a `Timeout(dur)` scope (exactly one child).
    pub fn timeout(&mut self, dur: TickCount) -> &mut Self {
        self.open(ScopeKind::Timeout(dur))
    }

    /// Open a `Delay(dur)` scope (exactly one child).
    pub fn delay(&mut self, dur: TickCount) -> &mut Self {
        self.open(ScopeKind::Delay(dur))
    }

    /// Open a `Guard(cond)` scope (exactly one child).
    pub fn guard(&mut self, cond: impl Fn(Option<&crate::state::StateRef>) -> bool + 'static) -> &mut Self {
        self.open(ScopeKind::Guard(Rc::new(cond)))
    }

    /// Open a `Scope(on_enter, on_exit)` scope (exactly one child).
    pub fn scope(&mut self, on_enter: Option<ScopeEnterFn>, on_exit: Option<ScopeExitFn>) -> &mut Self {
        self.open(ScopeKind::Scope(on_enter, on_exit))
    }

    // -- leaves --

    /// Append an `Action` leaf.
    pub fn action(&mut self, f: impl Fn(Option<&crate::state::StateRef>) -> Status + 'static) -> &mut Self {
        let action: ActionFn = Rc::new(f);
        self.push_leaf(NodeKind::Action(action))
    }

    /// Append a `Condition` leaf.
    pub fn condition(&mut self, f: impl Fn(Option<&crate::state::StateRef>) -> bool + 'static) -> &mut Self {
        let cond: ConditionFn = Rc::new(f);
        self.push_leaf(NodeKind::Condition(cond))
    }

    /// Append a constant-`Success` leaf.
    pub fn success(&mut self) -> &mut Self {
        self.push_leaf(NodeKind::SuccessLeaf)
    }

    /// Append a constant-`Failure` leaf.
    pub fn failure(&mut self) -> &mut Self {
        self.push_leaf(NodeKind::FailureLeaf)
    }

    /// Append a `Wait(dur)` leaf.
    pub fn wait(&mut self, dur: TickCount) -> &mut Self {
        self.push_leaf(NodeKind::Wait(dur))
    }

    /// Append a `WaitUntil(cond, interval)` leaf.
    pub fn wait_until(
        &mut self,
        cond: impl Fn(Option<&crate::state::StateRef>) -> bool + 'static,
        interval: Option<TickCount>,
    ) -> &mut Self {
        let cond: ConditionFn = Rc::new(cond);
        self.push_leaf(NodeKind::WaitUntil(cond, interval))
    }

    /// Append a `Yield` leaf.
    pub fn yield_node(&mut self) -> &mut Self {
        self.push_leaf(NodeKind::Yield)
    }

    /// Append a `Return(status)` leaf.
    pub fn return_status(&mut self, status: Status) -> &mut Self {
        self.push_leaf(NodeKind::Return(status))
    }

    /// Append a `SubTree` leaf that always descends into `tree` (which may
    /// be the tree currently being built, for self-recursion).
    pub fn subtree_static(&mut self, tree: FlowTree) -> &mut Self {
        self.push_leaf(NodeKind::SubTree(SubTreeSpec::Static(tree)))
    }

    /// Append a `SubTree` leaf that resolves which tree to descend into
    /// via `provider`.
    pub fn subtree_dynamic(&mut self, provider: DynamicTreeProvider) -> &mut Self {
        self.push_leaf(NodeKind::SubTree(SubTreeSpec::Dynamic(provider)))
    }

    /// Append a `SubTree` leaf that resolves the tree via `provider` and
    /// builds a fresh child state via `state_provider`, wiring its parent
    /// link to the caller's state.
    pub fn subtree_injecting(&mut self, provider: DynamicTreeProvider, state_provider: StateProvider) -> &mut Self {
        self.push_leaf(NodeKind::SubTree(SubTreeSpec::StateInjecting(provider, state_provider)))
    }

    /// Finish building: every scope must already be closed (via `end()`)
    /// and at least one node must have been built to serve as the root.
    pub fn complete(&mut self) -> Result<FlowTree, FlowError> {
        if !self.stack.is_empty() {
            return Err(FlowError::BuilderIncomplete { open_scopes: self.stack.len() });
        }
        match self.root {
            Some(root) => {
                self.tree.set_root(root);
                Ok(self.tree.clone())
            }
            None => Err(FlowError::BuilderIncomplete { open_scopes: 0 }),
        }
    }
}

fn only_child(children: Vec<NodeId>) -> NodeId {
    *children.first().expect("decorator scope closed with no child built")
}
