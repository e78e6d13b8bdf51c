//! Block actors, cycle reduction and drivers for halo simulations.
//!
//! Each mesh block is owned by one [`BlockActor`]. Per cycle an actor
//! contributes a timestep candidate and stop vote to the
//! [`ReductionCoordinator`], waits for the merged result, sends its
//! boundary layers to every active neighbor, waits until its quorum of
//! ghost messages has arrived, then runs the compute methods.
//!
//! A [`Domain`] wires actors and coordinator together over
//! `crossbeam-channel` and runs them either one thread per actor
//! ([`Domain::run_threaded`]) or deterministically on the calling thread
//! ([`Domain::run_lockstep`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod actor;
pub mod config;
pub mod domain;
pub mod message;
pub mod metrics;
pub mod reduction;

pub use actor::{BlockActor, BlockReport, BlockState};
pub use config::{ConfigError, DomainConfig};
pub use domain::{Domain, RunError, RunReport};
pub use message::{Contribution, Envelope, GhostMessage, PeerDirectory};
pub use metrics::BlockMetrics;
pub use reduction::{CycleRecord, CycleReducer, ReductionCoordinator};
