//! The top-level tick driver.

use foundry_core::{TickCount, TickId};

use crate::cancellation::CancellationToken;
use crate::context::SystemContext;
use crate::error::PipelineError;
use crate::executor::Executor;
use crate::group::SystemGroup;
use crate::registry::Registry;

/// Owns the monotonic tick counter and drives a system tree each tick
/// against a [`Registry`].
pub struct Pipeline {
    current_tick: TickId,
    executor: Executor,
    cancellation_token: CancellationToken,
}

impl Pipeline {
    /// Construct a pipeline starting at tick 0, backed by `executor`.
    pub fn new(executor: Executor) -> Self {
        Pipeline { current_tick: TickId::ZERO, executor, cancellation_token: CancellationToken::new() }
    }

    /// Current tick value.
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// This pipeline's cancellation token. Cloning it and calling
    /// `cancel()` requests that in-flight parallel systems stop starting
    /// new entity work.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Advance `current_tick` by `delta_ticks`, build a fresh
    /// [`SystemContext`], and run `group` against `registry`.
    pub fn execute(
        &mut self,
        group: &mut SystemGroup,
        registry: &dyn Registry,
        delta_ticks: TickCount,
    ) -> Result<(), PipelineError> {
        self.current_tick = self.current_tick.advance(delta_ticks);
        let context = SystemContext::new(delta_ticks, self.current_tick, self.cancellation_token.clone());
        self.executor.run_group(group, registry, &context)
    }

    /// Reset `current_tick` to 0. Does not touch the cancellation token
    /// or any system/group state.
    pub fn reset(&mut self) {
        self.current_tick = TickId::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupMode;
    use crate::worker_pool::WorkerPool;
    use foundry_arena::Handle;

    #[test]
    fn current_tick_accumulates_deltas_and_resets() {
        let mut pipeline = Pipeline::new(Executor::new(WorkerPool::new(1)));
        let registry: Vec<Handle> = Vec::new();
        let mut group = SystemGroup::new("root", GroupMode::Serial);

        for delta in [TickCount::new(2), TickCount::new(3), TickCount::new(5)] {
            pipeline.execute(&mut group, &registry, delta).unwrap();
        }
        assert_eq!(pipeline.current_tick(), TickId(10));

        pipeline.reset();
        assert_eq!(pipeline.current_tick(), TickId::ZERO);
    }
}
