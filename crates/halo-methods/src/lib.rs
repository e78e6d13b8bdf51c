//! Reference collaborators for halo simulations.
//!
//! Small, dependable implementations of every collaborator contract in
//! [`halo_method`], enough to drive the block-exchange protocol end to end:
//!
//! - [`JacobiDiffusion`]: explicit 7-point diffusion reading ghost cells.
//! - [`NonNegativeCheck`]: reports negative values without failing.
//! - [`FixedTimestep`] and [`CflTimestep`]: timestep policies.
//! - [`StopAt`]: stop at a cycle or a simulation time.
//! - [`IntervalOutput`]: shortens steps to land on output times.
//! - [`ReflectingBoundary`] and [`ConstantBoundary`]: boundary conditions.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod check;
pub mod diffusion;
pub mod output;
pub mod stopping;
pub mod timestep;

pub use boundary::{ConstantBoundary, ReflectingBoundary};
pub use check::NonNegativeCheck;
pub use diffusion::JacobiDiffusion;
pub use output::IntervalOutput;
pub use stopping::StopAt;
pub use timestep::{CflTimestep, FixedTimestep};
