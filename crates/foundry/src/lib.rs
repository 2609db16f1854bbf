//! Foundry: the game-foundation framework core.
//!
//! Four subsystems, each usable standalone or together:
//!
//! - [`arena`]: a generational entity arena and type-erased handles.
//! - [`pipeline`]: a fixed-tick system pipeline over nested serial/parallel
//!   groups.
//! - [`flow`]: a behavior-tree-style flow-control engine.
//! - [`spatial`]: a two-phase spatial query engine (broad-phase + narrow-phase).
//!
//! [`core`] carries the math primitives and tick newtypes the other four
//! share.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use foundry::arena::{Arena, Handle};
//! use foundry::core::TickCount;
//! use foundry::flow::{FlowTree, Status};
//! use foundry::pipeline::{Executor, GroupMode, Pipeline, SystemGroup, WorkerPool};
//! use foundry::spatial::{RayQuery, SpatialWorld, SpatialWorldConfig, SphereParams};
//!
//! #[derive(Default)]
//! struct Unit {
//!     hp: i32,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Arena: spawn an entity behind a generational handle.
//! let arena: Arc<Arena<Unit>> = Arc::new(Arena::new());
//! let (index, generation) = arena.allocate(|unit| unit.hp = 10)?;
//! let handle = Handle::new(arena.clone(), index, generation);
//! assert!(handle.is_valid());
//!
//! // Pipeline: tick an (empty, for this example) system tree once.
//! let mut pipeline = Pipeline::new(Executor::new(WorkerPool::new(2)));
//! let mut root = SystemGroup::new("root", GroupMode::Serial);
//! let registry: Vec<Handle> = vec![handle.clone()];
//! pipeline.execute(&mut root, &registry, TickCount::new(1))?;
//!
//! // Flow: a one-action behavior tree.
//! let tree = FlowTree::new("idle");
//! tree.builder().action(|_state| Status::Success).complete()?;
//! assert_eq!(tree.tick(TickCount::new(1), None), Status::Success);
//!
//! // Spatial: register a shape and raycast against it.
//! let mut world = SpatialWorld::new(SpatialWorldConfig::default())?;
//! world.add_sphere(
//!     SphereParams { center: foundry::core::Vector3::ZERO, radius: 1.0 },
//!     true,
//!     0,
//!     1,
//! );
//! let hit = world.raycast(RayQuery::new(
//!     foundry::core::Vector3::new(-5.0, 0.0, 0.0),
//!     foundry::core::Vector3::UNIT_X,
//!     10.0,
//! ));
//! assert!(hit.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! | Re-export | Crate | Covers |
//! |---|---|---|
//! | [`core`] | `foundry-core` | `Vector3`, `Aabb`, `TickId`/`TickCount` |
//! | [`arena`] | `foundry-arena` | `Arena`, `Handle`, `EntityContainer` |
//! | [`pipeline`] | `foundry-pipeline` | `Pipeline`, `SystemGroup`, system traits |
//! | [`flow`] | `foundry-flow` | `FlowTree`, `FlowBuilder`, `Status` |
//! | [`spatial`] | `foundry-spatial` | `SpatialWorld`, broad-phase strategies |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Shared math primitives, ids, and error conventions.
pub use foundry_core as core;

/// Generational entity arena, type-erased handles, and the entity container.
pub use foundry_arena as arena;

/// Fixed-tick system pipeline: serial/parallel/ordered-serial systems over
/// nested groups.
pub use foundry_pipeline as pipeline;

/// Behavior-tree-style flow control: sub-tree call stacks, per-depth node
/// state, deterministic tick semantics.
pub use foundry_flow as flow;

/// Two-phase spatial query engine: SoA shape registry, pluggable
/// broad-phase strategies, pure narrow-phase geometry.
pub use foundry_spatial as spatial;

/// The small set of types most call sites need, gathered from across every
/// subsystem.
pub mod prelude {
    pub use foundry_core::{Aabb, TickCount, TickId, Vector3};

    pub use foundry_arena::{Arena, EntityContainer, Handle};

    pub use foundry_flow::{FlowBuilder, FlowTree, Status};

    pub use foundry_pipeline::{
        Executor, GroupMode, Pipeline, Registry, SerialSystem, SystemGroup, WorkerPool,
    };

    pub use foundry_spatial::{
        BroadPhaseKind, HitResult, RayQuery, SpatialWorld, SpatialWorldConfig, SphereParams,
    };
}
