//! The closed set of node kinds, represented as a tagged enum (spec §9
//! design notes: "represent the ~30 node kinds as a tagged variant...
//! avoid virtual-dispatch overhead by enum dispatch where possible").
//!
//! Each node also owns a per-depth runtime-state table (`SmallVec`-backed,
//! inline capacity 4 per spec §3 "initial capacity is small (≈4)") and, for
//! `RoundRobin` only, a cursor that survives `FlowTree::reset()` (§9 Open
//! Question 4) and therefore lives outside that table.

use std::cell::Cell;

use foundry_core::TickCount;
use smallvec::SmallVec;

use crate::callbacks::{ActionFn, ConditionFn, DynamicTreeProvider, ScopeEnterFn, ScopeExitFn, StateProvider};
use crate::state::StateRef;
use crate::status::Status;
use crate::tree::FlowTree;

/// Opaque reference to a node within one [`FlowTree`]'s node table.
pub type NodeId = usize;

/// Policy shared by `Parallel` and `Join`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Terminal `Success` iff every child succeeds; `Failure` on the first
    /// child failure.
    RequireAll,
    /// Terminal `Success` on the first child success; `Failure` iff every
    /// child fails.
    RequireOne,
}

/// `SubTree` variants (spec §4.4.4).
#[derive(Clone)]
pub enum SubTreeSpec {
    /// Always descends into the same fixed tree.
    Static(FlowTree),
    /// Resolves which tree to descend into via a provider, evaluated once
    /// per fresh entry to a depth (not re-evaluated while `Running`).
    Dynamic(DynamicTreeProvider),
    /// Like `Dynamic`, additionally building a fresh child state from the
    /// caller's state and wiring `child.parent` to it.
    StateInjecting(DynamicTreeProvider, StateProvider),
}

/// One node's identity: its kind plus, for composites/decorators, the
/// `NodeId`s of its children.
#[derive(Clone)]
pub enum NodeKind {
    /// Run children in order; `Failure` short-circuits, `Success` iff all
    /// succeed.
    Sequence(Vec<NodeId>),
    /// Run children in order; `Success` short-circuits, `Failure` iff all
    /// fail.
    Selector(Vec<NodeId>),
    /// Tick every child every tick, regardless of prior terminal status.
    Parallel(ParallelPolicy, Vec<NodeId>),
    /// Tick every child in order until the first terminal result; returns
    /// it without ticking the remaining children that tick.
    Race(Vec<NodeId>),
    /// Like `Parallel`, but a child that has already reached a terminal
    /// status is not re-ticked; waits for all to reach one.
    Join(ParallelPolicy, Vec<NodeId>),
    /// Pick one child uniformly at random at the first tick of a depth;
    /// return its result; reselect after the next terminal.
    RandomSelector(Vec<NodeId>),
    /// Shuffle children at first entry to a depth; run in shuffled order
    /// until one succeeds or all fail; reshuffle after the next terminal.
    ShuffledSelector(Vec<NodeId>),
    /// Like `RandomSelector`, with per-child integer weights.
    WeightedRandomSelector(Vec<(u32, NodeId)>),
    /// A persistent cursor (see `Node::round_robin_cursor`) selects one
    /// child per fresh entry and advances modulo the child count.
    RoundRobin(Vec<NodeId>),
    /// Swap `Success`/`Failure`; pass `Running` through.
    Inverter(NodeId),
    /// Replace any terminal result with `Success`; pass `Running` through.
    Succeeder(NodeId),
    /// Replace any terminal result with `Failure`; pass `Running` through.
    Failer(NodeId),
    /// Run the child up to `n` times in succession (one tick per attempt
    /// after the first); `Failure` short-circuits; `Success` after the
    /// `n`-th success.
    Repeat(u32, NodeId),
    /// Keep re-ticking the child while it succeeds; terminal `Success`
    /// once it finally fails.
    RepeatUntilFail(NodeId),
    /// Keep re-ticking the child while it fails; terminal `Success` once
    /// it finally succeeds.
    RepeatUntilSuccess(NodeId),
    /// Re-run the child on `Failure` up to `n` times; terminal `Success`
    /// short-circuits.
    Retry(u32, NodeId),
    /// Accumulate ticks; `Failure` once the child is still `Running` after
    /// `dur` ticks elapse.
    Timeout(TickCount, NodeId),
    /// `Running` until `dur` ticks elapse, then tick the child.
    Delay(TickCount, NodeId),
    /// Evaluate the condition; `Failure` without ticking the child if
    /// false.
    Guard(ConditionFn, NodeId),
    /// Fire `on_enter` at first entry to a depth, tick the child, fire
    /// `on_exit` exactly once on any terminal result (never on `Running`).
    Scope(Option<ScopeEnterFn>, Option<ScopeExitFn>, NodeId),
    /// Return the callback's status directly.
    Action(ActionFn),
    /// `Success` if the predicate holds, else `Failure`.
    Condition(ConditionFn),
    /// `Running` until `dur` ticks elapse, then `Success`.
    Wait(TickCount),
    /// `Running` until the condition holds; if an interval is given, the
    /// condition is evaluated only once per `interval` ticks.
    WaitUntil(ConditionFn, Option<TickCount>),
    /// `Running` on the first tick of a depth, `Success` on the next.
    Yield,
    /// Constant `Success`.
    SuccessLeaf,
    /// Constant `Failure`.
    FailureLeaf,
    /// Signal the owning tree to reset once this tick's `tick()` call
    /// returns, and yield `status` directly.
    Return(Status),
    /// Descend into another tree (spec §4.4.4).
    SubTree(SubTreeSpec),
}

/// Bookkeeping a stateful node keeps at one particular recursion depth.
/// `Empty` is the value every fresh depth entry (and every reset) holds.
#[derive(Clone, Default)]
pub enum NodeRuntimeState {
    /// No in-progress bookkeeping at this depth.
    #[default]
    Empty,
    /// `Sequence`/`Selector`: index of the child currently `Running`.
    ChildIndex(usize),
    /// `RandomSelector`/`WeightedRandomSelector`/`RoundRobin`: the chosen
    /// child index for this round.
    ChosenChild(usize),
    /// `ShuffledSelector`: the shuffled child order plus the current
    /// position within it.
    ShuffleOrder(SmallVec<[usize; 8]>, usize),
    /// `Parallel`/`Join`: per-child terminal status accumulated so far
    /// this round (`None` while a child is still `Running` or, for
    /// `Join`, not yet ticked).
    ChildStatuses(SmallVec<[Option<Status>; 8]>),
    /// `Repeat`: successes so far. `Retry`: failures so far.
    Count(u32),
    /// `Timeout`/`Delay`/`Wait`/`WaitUntil`: ticks accumulated so far.
    Elapsed(u32),
    /// `Scope`: whether `on_enter` has already fired this round.
    Entered(bool),
    /// `Yield`: whether the first (`Running`) tick has already happened.
    Yielded(bool),
    /// `SubTree`: the tree currently being descended into and the state
    /// it was ticked with, held across `Running` ticks so a dynamic
    /// provider is not re-evaluated mid-run (spec §4.4.4).
    SubTreeFrame(FlowTree, Option<StateRef>),
}

/// One node's kind plus its per-depth runtime state table.
pub(crate) struct Node {
    pub kind: NodeKind,
    pub depth_states: SmallVec<[NodeRuntimeState; 4]>,
    /// `RoundRobin` only: persists across `FlowTree::reset()` (§9 OQ4).
    pub round_robin_cursor: Cell<usize>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Node { kind, depth_states: SmallVec::new(), round_robin_cursor: Cell::new(0) }
    }
}
