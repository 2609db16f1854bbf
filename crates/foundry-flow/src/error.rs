//! Error type for the flow-tree builder.

use std::error::Error;
use std::fmt;

/// Failure conditions raised while building a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// `complete()` was called while one or more composite/decorator
    /// scopes were still open (missing `end()` calls), or no node was
    /// ever built to serve as the root.
    BuilderIncomplete {
        /// Number of scopes still open at the time `complete()` was called.
        open_scopes: usize,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::BuilderIncomplete { open_scopes } => {
                write!(f, "flow tree builder left {open_scopes} scope(s) open at complete()")
            }
        }
    }
}

impl Error for FlowError {}
