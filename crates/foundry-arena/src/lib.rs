//! Generational entity arena, type-erased handles, and the append-only
//! entity container.
//!
//! An [`Arena<E>`] is a slot-reusing pool that owns records of type `E` and
//! hands out `(index, generation)` pairs. A [`Handle`] wraps an
//! `Arc<dyn AnyArena>` plus an `(index, generation)` pair so that code
//! which doesn't know the concrete entity type can still check validity
//! and, when it does know the type, recover a typed reference via
//! [`Handle::try_as`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
pub mod container;
pub mod error;
pub mod handle;

pub use arena::{AnyArena, Arena};
pub use container::EntityContainer;
pub use error::ArenaError;
pub use handle::Handle;
