//! Dispatches a [`SystemNode`] (leaf system or nested group) according to
//! its kind.

use crate::context::SystemContext;
use crate::error::PipelineError;
use crate::group::{GroupMode, SystemGroup};
use crate::registry::Registry;
use crate::system::SystemNode;
use crate::worker_pool::WorkerPool;

/// Drives a system tree, routing each node to the dispatch strategy its
/// kind requires.
pub struct Executor {
    pool: WorkerPool,
}

impl Executor {
    /// Construct an executor backed by the given worker pool.
    pub fn new(pool: WorkerPool) -> Self {
        Executor { pool }
    }

    /// Dispatch a single node: gather handles, run serial/ordered-serial
    /// systems on the calling thread, fan parallel systems out across the
    /// worker pool, or recurse into a nested group.
    pub fn run_node(
        &self,
        node: &mut SystemNode,
        registry: &dyn Registry,
        context: &SystemContext,
    ) -> Result<(), PipelineError> {
        match node {
            SystemNode::Serial(system) => {
                if system.is_enabled() {
                    let handles = registry.handles();
                    system.process_serial(registry, &handles, context);
                }
                Ok(())
            }
            SystemNode::OrderedSerial(system) => {
                if system.is_enabled() {
                    let handles = registry.handles();
                    let mut ordered = Vec::with_capacity(handles.len());
                    system.order_entities(&handles, &mut ordered);
                    system.process_serial(registry, &ordered, context);
                }
                Ok(())
            }
            SystemNode::Parallel(system) => {
                if system.is_enabled() {
                    let handles = registry.handles();
                    self.pool.dispatch(system.as_ref(), registry, &handles, context);
                }
                Ok(())
            }
            SystemNode::Group(group) => self.run_group(group, registry, context),
            SystemNode::Unknown { name } => Err(PipelineError::UnknownSystemKind { name: name.clone() }),
        }
    }

    /// Dispatch a group's children per its [`GroupMode`]. A disabled
    /// group skips every child unconditionally.
    pub fn run_group(
        &self,
        group: &mut SystemGroup,
        registry: &dyn Registry,
        context: &SystemContext,
    ) -> Result<(), PipelineError> {
        if !group.is_enabled() {
            return Ok(());
        }
        match group.mode() {
            GroupMode::Serial => {
                for child in group.children_mut() {
                    self.run_node(child, registry, context)?;
                }
                Ok(())
            }
            GroupMode::Parallel => {
                let mut first_err = None;
                std::thread::scope(|scope| {
                    let results: Vec<_> = group
                        .children_mut()
                        .iter_mut()
                        .map(|child| scope.spawn(|| self.run_node(child, registry, context)))
                        .collect();
                    for handle in results {
                        if let Err(err) = handle.join().expect("child system panicked") {
                            if first_err.is_none() {
                                first_err = Some(err);
                            }
                        }
                    }
                });
                match first_err {
                    Some(err) => Err(err),
                    None => Ok(()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::system::SerialSystem;
    use foundry_arena::{Arena, AnyArena, Handle};
    use foundry_core::{TickCount, TickId};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Dummy;

    struct LoggingSystem {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl SerialSystem for LoggingSystem {
        fn name(&self) -> &str {
            self.name
        }
        fn process_serial(&mut self, _registry: &dyn Registry, _handles: &[Handle], _context: &SystemContext) {
            self.log.lock().unwrap().push(self.name);
        }
    }

    fn context() -> SystemContext {
        SystemContext::new(TickCount::new(1), TickId(1), CancellationToken::new())
    }

    #[test]
    fn serial_group_runs_children_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = SystemGroup::new("root", GroupMode::Serial);
        group.push(SystemNode::Serial(Box::new(LoggingSystem { name: "a", log: Arc::clone(&log) })));
        group.push(SystemNode::Serial(Box::new(LoggingSystem { name: "b", log: Arc::clone(&log) })));
        group.push(SystemNode::Serial(Box::new(LoggingSystem { name: "c", log: Arc::clone(&log) })));

        let executor = Executor::new(WorkerPool::new(2));
        let registry: Vec<Handle> = Vec::new();
        executor.run_group(&mut group, &registry, &context()).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn disabled_group_skips_all_children() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut group = SystemGroup::new("root", GroupMode::Serial);
        group.push(SystemNode::Serial(Box::new(LoggingSystem { name: "a", log: Arc::clone(&log) })));
        group.set_enabled(false);

        let executor = Executor::new(WorkerPool::new(2));
        let registry: Vec<Handle> = Vec::new();
        executor.run_group(&mut group, &registry, &context()).unwrap();
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_system_kind_fails_fast() {
        let mut node = SystemNode::Unknown { name: "mystery".to_string() };
        let executor = Executor::new(WorkerPool::new(1));
        let registry: Vec<Handle> = Vec::new();
        let err = executor.run_node(&mut node, &registry, &context()).unwrap_err();
        assert_eq!(err, PipelineError::UnknownSystemKind { name: "mystery".to_string() });
    }

    #[test]
    fn nested_serial_of_parallel_of_serial_preserves_inner_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut inner_serial_before = SystemGroup::new("before", GroupMode::Serial);
        inner_serial_before.push(SystemNode::Serial(Box::new(LoggingSystem {
            name: "before",
            log: Arc::clone(&log),
        })));

        let mut parallel_region = SystemGroup::new("parallel", GroupMode::Parallel);
        parallel_region.push(SystemNode::Group({
            let mut g = SystemGroup::new("p1", GroupMode::Serial);
            g.push(SystemNode::Serial(Box::new(LoggingSystem { name: "p1a", log: Arc::clone(&log) })));
            g.push(SystemNode::Serial(Box::new(LoggingSystem { name: "p1b", log: Arc::clone(&log) })));
            g
        }));

        let mut inner_serial_after = SystemGroup::new("after", GroupMode::Serial);
        inner_serial_after.push(SystemNode::Serial(Box::new(LoggingSystem {
            name: "after",
            log: Arc::clone(&log),
        })));

        let mut outer = SystemGroup::new("outer", GroupMode::Serial);
        outer.push(SystemNode::Group(inner_serial_before));
        outer.push(SystemNode::Group(parallel_region));
        outer.push(SystemNode::Group(inner_serial_after));

        let executor = Executor::new(WorkerPool::new(2));
        let registry: Vec<Handle> = Vec::new();
        executor.run_group(&mut outer, &registry, &context()).unwrap();

        let observed = log.lock().unwrap().clone();
        assert_eq!(observed[0], "before");
        assert_eq!(observed[observed.len() - 1], "after");
        // p1a must precede p1b since they're in their own serial sub-group.
        let pos_a = observed.iter().position(|&x| x == "p1a").unwrap();
        let pos_b = observed.iter().position(|&x| x == "p1b").unwrap();
        assert!(pos_a < pos_b);
    }

    #[test]
    fn downcast_smoke_test_for_arena_interop() {
        let arena: Arc<dyn AnyArena> = Arc::new(Arena::<Dummy>::new());
        assert!(arena.downcast_ref::<Dummy>().is_some());
    }
}
