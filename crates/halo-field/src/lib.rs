//! Per-block field storage for halo simulations.
//!
//! A [`FieldBlock`] holds one or more scalar fields over a block's
//! interior cells plus a ghost layer on every axis that has more than one
//! cell. Ghost exchange moves a [`FaceRegion`] of boundary-adjacent
//! interior cells into the matching ghost cells of the neighbor through a
//! flat byte buffer.
//!
//! [`BlockGeometry`] maps block indices to physical extents.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod geometry;
pub mod region;

pub use block::FieldBlock;
pub use geometry::BlockGeometry;
pub use region::{FaceRegion, RegionRole};
