//! Shared math primitives, id newtypes, and error conventions used across
//! the foundry engine core crates (`foundry-arena`, `foundry-pipeline`,
//! `foundry-flow`, `foundry-spatial`).
//!
//! Nothing in this crate depends on any other foundry crate; everything
//! else depends on this one.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aabb;
pub mod geometry;
pub mod tick;
pub mod vector3;

pub use aabb::Aabb;
pub use tick::{TickCount, TickId};
pub use vector3::Vector3;
