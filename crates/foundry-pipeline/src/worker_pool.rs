//! Fan-out for parallel systems and parallel groups.
//!
//! Workers are spawned scoped to one dispatch call via `std::thread::scope`
//! (borrowing the handle slice and context directly — a persistent,
//! `'static`-job-queue pool like `murk_engine::tick_thread`'s would need
//! unsafe lifetime erasure to let workers borrow tick-local data the way
//! `rayon::ThreadPool` does internally, and this crate forbids unsafe
//! code). Completion is still signalled back over a bounded
//! `crossbeam-channel`, the same reply-channel idiom
//! `tick_thread::IngressBatch` uses. Concurrency width is resolved the way
//! `murk_engine::config` resolves its async worker count.

use foundry_arena::Handle;

use crate::context::SystemContext;
use crate::registry::Registry;
use crate::system::ParallelSystem;

/// Fans out per-entity work for [`ParallelSystem`]s and parallel-group
/// children across a bounded number of threads.
pub struct WorkerPool {
    worker_count: usize,
}

impl WorkerPool {
    /// Construct a pool sized to the given worker count (clamped to at
    /// least 1).
    pub fn new(worker_count: usize) -> Self {
        WorkerPool { worker_count: worker_count.max(1) }
    }

    /// Construct a pool sized to the host's available parallelism,
    /// falling back to 4 if it cannot be determined, matching
    /// `murk_engine::config::AsyncConfig::resolved_worker_count`'s
    /// fallback.
    pub fn with_available_parallelism() -> Self {
        let count = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        WorkerPool::new(count)
    }

    /// Number of worker threads this pool will fan out across.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Distribute `handles` across worker threads, calling
    /// `system.process_entity` for each. Honors `context`'s cancellation
    /// token: a worker stops starting new entities once cancellation is
    /// observed, though any entity already in progress completes.
    pub fn dispatch(
        &self,
        system: &dyn ParallelSystem,
        registry: &dyn Registry,
        handles: &[Handle],
        context: &SystemContext,
    ) {
        if handles.is_empty() {
            return;
        }
        let worker_count = self.worker_count.min(handles.len()).max(1);
        let chunk_size = handles.len().div_ceil(worker_count);
        let chunks: Vec<_> = handles.chunks(chunk_size.max(1)).collect();
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(chunks.len());

        std::thread::scope(|scope| {
            for chunk in &chunks {
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for handle in *chunk {
                        if context.is_cancelled() {
                            break;
                        }
                        system.process_entity(registry, handle, context);
                    }
                    let _ = done_tx.send(());
                });
            }
            drop(done_tx);
            for _ in 0..chunks.len() {
                let _ = done_rx.recv();
            }
        });
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        WorkerPool::with_available_parallelism()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use foundry_arena::{Arena, Handle};
    use foundry_core::{TickCount, TickId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Dummy;

    struct CountingSystem {
        counter: Arc<AtomicUsize>,
    }

    impl ParallelSystem for CountingSystem {
        fn name(&self) -> &str {
            "counting"
        }
        fn process_entity(&self, _registry: &dyn Registry, _handle: &Handle, _context: &SystemContext) {
            self.counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dispatch_visits_every_handle_exactly_once() {
        let arena: Arc<dyn foundry_arena::AnyArena> = Arc::new(Arena::<Dummy>::new());
        let concrete = arena.downcast_ref::<Dummy>().unwrap();
        let handles: Vec<Handle> = (0..50)
            .map(|_| {
                let (index, generation) = concrete.allocate(|_| {}).unwrap();
                Handle::new(Arc::clone(&arena), index, generation)
            })
            .collect();

        let counter = Arc::new(AtomicUsize::new(0));
        let system = CountingSystem { counter: Arc::clone(&counter) };
        let pool = WorkerPool::new(4);
        let context = SystemContext::new(TickCount::new(1), TickId(1), CancellationToken::new());
        let registry: Vec<Handle> = handles.clone();

        pool.dispatch(&system, &registry, &handles, &context);
        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[test]
    fn cancellation_stops_further_dispatch_within_a_chunk() {
        let arena: Arc<dyn foundry_arena::AnyArena> = Arc::new(Arena::<Dummy>::new());
        let concrete = arena.downcast_ref::<Dummy>().unwrap();
        let handles: Vec<Handle> = (0..10)
            .map(|_| {
                let (index, generation) = concrete.allocate(|_| {}).unwrap();
                Handle::new(Arc::clone(&arena), index, generation)
            })
            .collect();

        let counter = Arc::new(AtomicUsize::new(0));
        let system = CountingSystem { counter: Arc::clone(&counter) };
        let pool = WorkerPool::new(1);
        let token = CancellationToken::new();
        token.cancel();
        let context = SystemContext::new(TickCount::new(1), TickId(1), token);
        let registry: Vec<Handle> = handles.clone();

        pool.dispatch(&system, &registry, &handles, &context);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
