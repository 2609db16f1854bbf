//! Integer tick newtypes shared by the pipeline and flow-tree engines.
//!
//! The source material this workspace is built from carried both
//! tick-based and float-seconds time in different places; this engine
//! standardizes on integer ticks throughout (see `DESIGN.md`).

use std::fmt;
use std::ops::{Add, AddAssign};

/// A monotonically increasing tick counter, e.g. `Pipeline::current_tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TickId(pub u64);

impl TickId {
    /// The initial tick value, `0`.
    pub const ZERO: TickId = TickId(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: TickCount) -> TickId {
        TickId(self.0 + delta.0 as u64)
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A non-negative count of ticks: a duration, or a per-call delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct TickCount(pub u32);

impl TickCount {
    /// Zero ticks.
    pub const ZERO: TickCount = TickCount(0);

    /// Construct from a raw count.
    pub const fn new(count: u32) -> Self {
        Self(count)
    }
}

impl fmt::Display for TickCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for TickCount {
    type Output = TickCount;
    fn add(self, rhs: TickCount) -> TickCount {
        TickCount(self.0 + rhs.0)
    }
}

impl AddAssign for TickCount {
    fn add_assign(&mut self, rhs: TickCount) {
        self.0 += rhs.0;
    }
}

impl From<u32> for TickCount {
    fn from(value: u32) -> Self {
        TickCount(value)
    }
}
