//! Error types for the halo workspace.
//!
//! Organized by subsystem: topology (configuration-time), field data
//! (pack/unpack), method hooks (numerical collaborators), and the
//! communication protocol itself. Topology and protocol errors are
//! fatal at the layer that detects them; method errors split into
//! fatal failures and transient reports.

use std::error::Error;
use std::fmt;

use crate::direction::Direction;
use crate::id::CycleId;
use crate::index::BlockIndex;

/// Errors detected while building the block topology.
///
/// These are configuration errors: nothing at the protocol layer can
/// recover from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TopologyError {
    /// The domain has zero blocks along some axis.
    EmptyDomain {
        /// The offending extents.
        extents: [u32; 3],
    },
    /// A block index lies outside the domain.
    IndexOutOfBounds {
        /// The offending index.
        index: [u32; 3],
        /// The domain extents.
        extents: [u32; 3],
    },
    /// A linear block position lies past the last block.
    LinearOutOfBounds {
        /// The offending position.
        linear: usize,
        /// Number of blocks in the domain.
        block_count: usize,
    },
    /// A direction component is outside `{-1, 0, 1}` or all are zero.
    InvalidDirection {
        /// The offending components.
        components: [i8; 3],
    },
    /// A block has zero cells along some axis.
    ZeroCells {
        /// The offending cell counts.
        cells: [usize; 3],
    },
    /// An active direction has no neighbor to send to.
    MissingNeighbor {
        /// The sending block.
        index: BlockIndex,
        /// The active direction.
        direction: Direction,
    },
}

impl fmt::Display for TopologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain { extents } => {
                write!(f, "domain extents {extents:?} contain zero blocks")
            }
            Self::IndexOutOfBounds { index, extents } => {
                write!(f, "block index {index:?} outside extents {extents:?}")
            }
            Self::LinearOutOfBounds {
                linear,
                block_count,
            } => write!(
                f,
                "linear block position {linear} outside domain of {block_count} blocks"
            ),
            Self::InvalidDirection { components } => {
                write!(f, "invalid neighbor direction {components:?}")
            }
            Self::ZeroCells { cells } => write!(f, "block cell counts {cells:?} contain zero"),
            Self::MissingNeighbor { index, direction } => write!(
                f,
                "block {index} has active direction {direction} but no neighbor"
            ),
        }
    }
}

impl Error for TopologyError {}

/// Errors from per-block field storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldError {
    /// A ghost buffer does not match the size of the target region.
    BufferLength {
        /// Direction of the region being written.
        direction: Direction,
        /// Bytes the region needs.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },
    /// A field index is past the last field.
    FieldOutOfRange {
        /// The offending field.
        field: usize,
        /// Number of fields in the block.
        field_count: usize,
    },
    /// The block was configured with no fields.
    NoFields,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferLength {
                direction,
                expected,
                actual,
            } => write!(
                f,
                "ghost buffer for {direction} has {actual} bytes, region needs {expected}"
            ),
            Self::FieldOutOfRange { field, field_count } => {
                write!(f, "field {field} out of range (block has {field_count})")
            }
            Self::NoFields => write!(f, "block has no fields"),
        }
    }
}

impl Error for FieldError {}

/// Errors returned by numerical method hooks.
#[derive(Clone, Debug, PartialEq)]
pub enum MethodError {
    /// The method could not run.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// Field access failed inside the method.
    Field(FieldError),
}

impl fmt::Display for MethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::Field(e) => write!(f, "field access: {e}"),
        }
    }
}

impl Error for MethodError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FieldError> for MethodError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

/// Fatal failures of the block-exchange protocol.
///
/// Every variant means the protocol's invariants no longer hold (quorum
/// and traffic disagree, a message belongs to another cycle, a peer is
/// gone). The detecting actor stops immediately; nothing is sent to
/// peers.
#[derive(Clone, Debug, PartialEq)]
pub enum CommError {
    /// More ghost messages arrived in one cycle than the quorum allows.
    QuorumExceeded {
        /// The receiving block.
        block: BlockIndex,
        /// The cycle being counted.
        cycle: CycleId,
        /// The locally derived quorum.
        quorum: usize,
    },
    /// A message is tagged with a cycle other than the receiver's.
    CycleMismatch {
        /// The receiving block (or `None` for the coordinator).
        block: Option<BlockIndex>,
        /// The cycle the receiver is in.
        expected: CycleId,
        /// The cycle on the message.
        actual: CycleId,
    },
    /// A message arrived in a state that cannot accept it.
    UnexpectedMessage {
        /// The receiving block.
        block: BlockIndex,
        /// Name of the receiver's state.
        state: &'static str,
        /// Kind of message.
        message: &'static str,
    },
    /// A block contributed twice to the same cycle's reduction.
    DuplicateContribution {
        /// Linear position of the block.
        block: usize,
        /// The cycle.
        cycle: CycleId,
    },
    /// A timestep candidate or agreed step is NaN, infinite or negative.
    InvalidTimestep {
        /// Linear position of the block.
        block: usize,
        /// The cycle.
        cycle: CycleId,
        /// The offending value.
        dt: f64,
    },
    /// A ghost message repeats a direction already counted this cycle.
    DuplicateGhost {
        /// The receiving block.
        block: BlockIndex,
        /// The cycle being counted.
        cycle: CycleId,
        /// Receiver-relative direction, `None` for the self message.
        direction: Option<Direction>,
    },
    /// A ghost message names a sender that is not the neighbor in its
    /// direction.
    WrongSource {
        /// The receiving block.
        block: BlockIndex,
        /// Receiver-relative direction, `None` for the self message.
        direction: Option<Direction>,
        /// The sender named on the message.
        sender: BlockIndex,
    },
    /// A linear block position does not name a registered block.
    UnknownBlock {
        /// The offending position.
        block: usize,
    },
    /// A channel peer hung up.
    Disconnected {
        /// Which endpoint was lost.
        endpoint: String,
    },
    /// An opt-in liveness timeout expired while waiting.
    LivenessTimeout {
        /// The waiting block.
        block: BlockIndex,
        /// Name of the waiting state.
        state: &'static str,
        /// The cycle being waited on.
        cycle: CycleId,
    },
    /// The single-threaded driver found no actor able to make progress.
    Stalled {
        /// Lowest cycle among live blocks.
        cycle: CycleId,
    },
    /// Field pack/unpack failed.
    Field(FieldError),
    /// Topology construction failed.
    Topology(TopologyError),
    /// A method hook failed.
    Method {
        /// Name of the failing method.
        name: String,
        /// The underlying error.
        reason: MethodError,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuorumExceeded {
                block,
                cycle,
                quorum,
            } => write!(
                f,
                "block {block} received more than {quorum} ghost messages in cycle {cycle}"
            ),
            Self::CycleMismatch {
                block,
                expected,
                actual,
            } => match block {
                Some(b) => write!(
                    f,
                    "block {b} in cycle {expected} received message for cycle {actual}"
                ),
                None => write!(
                    f,
                    "reduction in cycle {expected} received contribution for cycle {actual}"
                ),
            },
            Self::UnexpectedMessage {
                block,
                state,
                message,
            } => write!(f, "block {block} received {message} in state {state}"),
            Self::DuplicateContribution { block, cycle } => {
                write!(f, "block #{block} contributed twice in cycle {cycle}")
            }
            Self::InvalidTimestep { block, cycle, dt } => {
                write!(f, "block #{block} has invalid timestep {dt} in cycle {cycle}")
            }
            Self::DuplicateGhost {
                block,
                cycle,
                direction,
            } => match direction {
                Some(d) => write!(
                    f,
                    "block {block} received a second ghost from {d} in cycle {cycle}"
                ),
                None => write!(
                    f,
                    "block {block} received a second self message in cycle {cycle}"
                ),
            },
            Self::WrongSource {
                block,
                direction,
                sender,
            } => match direction {
                Some(d) => write!(
                    f,
                    "block {block} received a ghost from {d} sent by {sender}"
                ),
                None => write!(f, "block {block} received a self message sent by {sender}"),
            },
            Self::UnknownBlock { block } => write!(f, "no block registered at #{block}"),
            Self::Disconnected { endpoint } => write!(f, "{endpoint} disconnected"),
            Self::LivenessTimeout {
                block,
                state,
                cycle,
            } => write!(
                f,
                "block {block} timed out in state {state} during cycle {cycle}"
            ),
            Self::Stalled { cycle } => write!(f, "no block can make progress in cycle {cycle}"),
            Self::Field(e) => write!(f, "field: {e}"),
            Self::Topology(e) => write!(f, "topology: {e}"),
            Self::Method { name, reason } => write!(f, "method '{name}' failed: {reason}"),
        }
    }
}

impl Error for CommError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Field(e) => Some(e),
            Self::Topology(e) => Some(e),
            Self::Method { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<FieldError> for CommError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

impl From<TopologyError> for CommError {
    fn from(e: TopologyError) -> Self {
        Self::Topology(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comm_error_chains_to_method_error() {
        let err = CommError::Method {
            name: "diffusion".into(),
            reason: MethodError::ExecutionFailed {
                reason: "bad stencil".into(),
            },
        };
        assert!(err.to_string().contains("diffusion"));
        assert!(err.source().is_some());
    }

    #[test]
    fn quorum_exceeded_display_names_block() {
        let err = CommError::QuorumExceeded {
            block: BlockIndex { ix: 1, iy: 0, iz: 2 },
            cycle: CycleId(3),
            quorum: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("(1, 0, 2)"));
        assert!(msg.contains("7"));
    }

    #[test]
    fn invalid_timestep_display_names_value() {
        let err = CommError::InvalidTimestep {
            block: 2,
            cycle: CycleId(5),
            dt: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("#2"));
        assert!(msg.contains("NaN"));
    }
}
