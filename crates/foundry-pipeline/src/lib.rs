//! Fixed-tick system pipeline.
//!
//! A [`Pipeline`] drives a tree of [`SystemGroup`]s and leaf systems
//! (serial, parallel, or ordered-serial) over a [`Registry`] of entity
//! handles each tick, honoring a [`CancellationToken`] that parallel
//! systems are expected to poll.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cancellation;
pub mod context;
pub mod error;
pub mod executor;
pub mod group;
pub mod pipeline;
pub mod registry;
pub mod system;
pub mod worker_pool;

pub use cancellation::CancellationToken;
pub use context::SystemContext;
pub use error::PipelineError;
pub use executor::Executor;
pub use group::{GroupMode, SystemGroup};
pub use pipeline::Pipeline;
pub use registry::Registry;
pub use system::{OrderedSerialSystem, ParallelSystem, SerialSystem, SystemNode};
pub use worker_pool::WorkerPool;
