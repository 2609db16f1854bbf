//! Error type for pipeline dispatch.

use std::error::Error;
use std::fmt;

/// Failure conditions raised while executing a system tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The executor was handed a [`crate::system::SystemNode`] whose kind
    /// tag it does not recognize. Closed-enum dispatch means this is only
    /// reachable via [`crate::system::SystemNode::Unknown`], which exists
    /// precisely to make this failure path constructible and testable.
    UnknownSystemKind {
        /// Name reported by the offending node, for diagnostics.
        name: String,
    },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::UnknownSystemKind { name } => {
                write!(f, "unknown system kind presented to executor: {name}")
            }
        }
    }
}

impl Error for PipelineError {}
