//! Block neighbor topology for halo simulations.
//!
//! Everything here is a pure function of static inputs (domain extents,
//! periodicity, local cell counts, refresh class) and is computed once
//! per block:
//!
//! - [`neighbor`] / [`is_boundary`]: index arithmetic with per-axis
//!   periodic wraparound.
//! - [`FaceSet`]: which of the 26 directions a block exchanges with.
//! - [`RefreshCounter`]: how many inbound messages complete a cycle.
//! - [`BlockTopology`]: the per-block cache of all of the above.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod block;
pub mod face_set;
pub mod refresh;
pub mod topology;

pub use block::BlockTopology;
pub use face_set::FaceSet;
pub use refresh::RefreshCounter;
pub use topology::{is_boundary, neighbor, neighbors, BoundaryFlags};
