//! Error type for arena operations.

use std::error::Error;
use std::fmt;

/// Failure conditions for [`crate::arena::Arena`] operations.
///
/// Invalid-handle conditions are reported as `bool`/`Option` per the
/// engine-wide convention (see spec's error-handling table); `ArenaError`
/// covers the remaining cases where growth itself cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    /// Growing the arena to satisfy an allocation would exceed the
    /// implementation's maximum addressable capacity.
    CapacityExceeded {
        /// The capacity that would have been required.
        requested: usize,
        /// The implementation's ceiling.
        limit: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArenaError::CapacityExceeded { requested, limit } => write!(
                f,
                "arena capacity exceeded: requested {requested}, limit {limit}"
            ),
        }
    }
}

impl Error for ArenaError {}
