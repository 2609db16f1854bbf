//! Advisory cancellation token polled by parallel systems.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cheaply-cloneable, thread-shareable cancellation flag.
///
/// Cancellation is advisory (spec §5): parallel systems are expected to
/// poll it per entity and return early, but in-flight work may complete.
/// Serial systems may ignore it entirely.
#[derive(Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// A fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        CancellationToken { flag: Arc::new(AtomicBool::new(false)) }
    }

    /// Request cancellation. Visible to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// `true` if [`CancellationToken::cancel`] has been called on this
    /// token or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
