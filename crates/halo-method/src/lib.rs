//! Collaborator contracts consumed by halo block actors.
//!
//! Every numerical decision a block makes is delegated to an injected
//! collaborator: boundary conditions ([`Boundary`]), the local timestep
//! ([`Timestep`]), termination ([`Stopping`]), output-driven timestep
//! limits ([`OutputSchedule`]) and per-cycle compute hooks ([`Method`]).
//! A [`Collaborators`] bundle is built once and shared read-only by every
//! actor in the domain.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collaborators;
pub mod context;
pub mod hooks;
pub mod registry;

pub use collaborators::{candidate_timestep, Collaborators};
pub use context::{BlockView, ComputeContext};
pub use hooks::{Boundary, Method, OutputSchedule, Stopping, Timestep};
pub use registry::{MethodList, RegistryError};
