//! Halo: actor-style ghost-cell exchange for block-structured meshes.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all halo sub-crates. For most users, adding `halo` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use halo::prelude::*;
//!
//! // Four blocks of 8×8 cells, periodic in x, diffusing one scalar field.
//! let config = DomainConfig {
//!     periodicity: Periodicity([true, false, false]),
//!     ..DomainConfig::new(
//!         BlockExtents::new(2, 2, 1).unwrap(),
//!         CellCounts::new(8, 8, 1).unwrap(),
//!     )
//! };
//! let methods = MethodList::new()
//!     .with(Box::new(JacobiDiffusion::new(0, 0.1)))
//!     .unwrap();
//! let collab = Collaborators::new(
//!     Arc::new(ReflectingBoundary),
//!     Arc::new(FixedTimestep(1e-3)),
//!     Arc::new(StopAt::cycle(9)),
//! )
//! .with_methods(methods);
//!
//! let domain = Domain::new(config, collab, |index, block| {
//!     if index.ix == 0 && index.iy == 0 {
//!         block.fill_interior(0, 1.0);
//!     }
//! })
//! .unwrap();
//! let report = domain.run_lockstep().unwrap();
//! assert_eq!(report.cycles(), 10);
//! assert_eq!(report.blocks[0].cycle, CycleId(10));
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `halo-core` | Indices, directions, cycle ids, reduction values, errors |
//! | [`topology`] | `halo-topology` | Neighbor resolution, active face sets, quorum |
//! | [`field`] | `halo-field` | Ghost-padded field storage, pack/unpack, geometry |
//! | [`method`] | `halo-method` | Collaborator traits and the method registry |
//! | [`methods`] | `halo-methods` | Reference boundaries, timesteps, stopping, methods |
//! | [`engine`] | `halo-engine` | Block actors, reduction coordinator, drivers |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and errors (`halo-core`).
///
/// Block indices and extents, the 26 [`types::Direction`]s, refresh
/// classes, [`types::CycleId`], and the error enums shared by every crate.
pub use halo_core as types;

/// Block topology (`halo-topology`).
///
/// [`topology::BlockTopology`] resolves neighbors once at construction and
/// derives the per-cycle quorum.
pub use halo_topology as topology;

/// Field storage (`halo-field`).
///
/// [`field::FieldBlock`] holds ghost-padded scalar fields and packs and
/// unpacks the boundary layers exchanged with neighbors.
pub use halo_field as field;

/// Collaborator traits (`halo-method`).
///
/// Implement [`method::Method`] for per-cycle compute, plus the boundary,
/// timestep, stopping and output hooks.
pub use halo_method as method;

/// Reference collaborators (`halo-methods`).
pub use halo_methods as methods;

/// Block actors and drivers (`halo-engine`).
///
/// [`engine::Domain::run_threaded`] runs one thread per block;
/// [`engine::Domain::run_lockstep`] runs deterministically on the calling
/// thread.
pub use halo_engine as engine;

/// Common imports for typical halo usage.
///
/// ```rust
/// use halo::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use halo_core::{
        Axis, BlockExtents, BlockIndex, CellCounts, CycleId, Direction, Face, Periodicity,
        RefreshClass,
    };

    // Errors
    pub use halo_core::{CommError, FieldError, MethodError, TopologyError};

    // Storage
    pub use halo_field::{BlockGeometry, FieldBlock};

    // Collaborators
    pub use halo_method::{
        Boundary, BlockView, Collaborators, ComputeContext, Method, MethodList, OutputSchedule,
        Stopping, Timestep,
    };

    // Reference collaborators
    pub use halo_methods::{
        CflTimestep, ConstantBoundary, FixedTimestep, IntervalOutput, JacobiDiffusion,
        NonNegativeCheck, ReflectingBoundary, StopAt,
    };

    // Engine
    pub use halo_engine::{
        BlockMetrics, BlockReport, ConfigError, Domain, DomainConfig, RunError, RunReport,
    };
}
