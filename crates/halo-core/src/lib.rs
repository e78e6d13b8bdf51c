//! Core types and errors for the halo block-exchange protocol.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! vocabulary shared by every other halo crate: block indices and domain
//! extents, the 26 neighbor directions, refresh classes, the per-cycle
//! reduction records, and the error enums for each subsystem.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod error;
pub mod id;
pub mod index;
pub mod reduction;

pub use direction::{Direction, NeighborClass, RefreshClass};
pub use error::{CommError, FieldError, MethodError, TopologyError};
pub use id::CycleId;
pub use index::{Axis, BlockExtents, BlockIndex, CellCounts, Face, Periodicity};
pub use reduction::{ReductionContribution, ReductionResult};
