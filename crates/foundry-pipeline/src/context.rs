//! Per-tick context passed to every system invocation.

use foundry_core::{TickCount, TickId};

use crate::cancellation::CancellationToken;

/// Context handed by reference to every system call within one
/// `Pipeline::execute`.
pub struct SystemContext {
    /// Ticks elapsed since the previous `execute` call.
    pub delta_ticks: TickCount,
    /// Monotonic tick counter, post-increment.
    pub current_tick: TickId,
    /// Advisory cancellation flag; parallel systems must poll it.
    pub cancellation_token: CancellationToken,
}

impl SystemContext {
    /// Construct a context for one `execute` call.
    pub fn new(delta_ticks: TickCount, current_tick: TickId, cancellation_token: CancellationToken) -> Self {
        Self { delta_ticks, current_tick, cancellation_token }
    }

    /// Convenience accessor matching [`CancellationToken::is_cancelled`].
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
