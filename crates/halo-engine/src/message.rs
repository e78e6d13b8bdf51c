//! Protocol messages and the peer directory.

use crossbeam_channel::Sender;

use halo_core::{
    BlockExtents, BlockIndex, CommError, CycleId, Direction, ReductionContribution,
    ReductionResult,
};

/// Boundary-layer data sent from one block to a neighbor.
///
/// `direction` is already receiver-relative: a block sending toward
/// `(dx, dy, dz)` tags the message with `(-dx, -dy, -dz)`, which names the
/// ghost region the receiver must fill. The self-addressed null message
/// has no direction and an empty payload.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostMessage {
    /// Sending block.
    pub source: BlockIndex,
    /// Cycle the data belongs to.
    pub cycle: CycleId,
    /// Receiver-side ghost region, or `None` for the null message.
    pub direction: Option<Direction>,
    /// Packed field data.
    pub payload: Vec<u8>,
}

impl GhostMessage {
    /// Ghost data for the receiver's `direction` region.
    pub fn data(source: BlockIndex, cycle: CycleId, direction: Direction, payload: Vec<u8>) -> Self {
        Self {
            source,
            cycle,
            direction: Some(direction),
            payload,
        }
    }

    /// The empty message a block sends itself every cycle.
    pub fn null(source: BlockIndex, cycle: CycleId) -> Self {
        Self {
            source,
            cycle,
            direction: None,
            payload: Vec::new(),
        }
    }

    /// Whether this is the null message.
    pub fn is_null(&self) -> bool {
        self.direction.is_none()
    }
}

/// A block's vote in one cycle's reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contribution {
    /// Linear position of the contributing block.
    pub block: usize,
    /// Cycle being reduced.
    pub cycle: CycleId,
    /// Candidate timestep and stop vote.
    pub value: ReductionContribution,
}

/// Everything that can arrive in a block's inbox.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    /// Ghost data from a neighbor (or the null message from self).
    Ghost(GhostMessage),
    /// Merged reduction result for a cycle.
    Reduced {
        /// Cycle the result belongs to.
        cycle: CycleId,
        /// Global timestep and stop flag.
        result: ReductionResult,
    },
}

impl Envelope {
    /// Short name of the message kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ghost(m) if m.is_null() => "null ghost message",
            Self::Ghost(_) => "ghost message",
            Self::Reduced { .. } => "reduction result",
        }
    }
}

/// Senders to every block inbox, indexed by linear block position.
#[derive(Clone, Debug)]
pub struct PeerDirectory {
    extents: BlockExtents,
    inboxes: Vec<Sender<Envelope>>,
}

impl PeerDirectory {
    /// Directory over `inboxes`, which must be in linear (x-fastest) order.
    pub fn new(extents: BlockExtents, inboxes: Vec<Sender<Envelope>>) -> Self {
        debug_assert_eq!(inboxes.len(), extents.block_count());
        Self { extents, inboxes }
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.inboxes.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.inboxes.is_empty()
    }

    /// Deliver `envelope` to the block at `target`.
    pub fn send(&self, target: BlockIndex, envelope: Envelope) -> Result<(), CommError> {
        let linear = self.extents.linear(target);
        let inbox = self
            .inboxes
            .get(linear)
            .ok_or(CommError::UnknownBlock { block: linear })?;
        inbox.send(envelope).map_err(|_| CommError::Disconnected {
            endpoint: format!("inbox of block {target}"),
        })
    }

    /// Deliver a copy of `envelope` to every block.
    pub fn broadcast(&self, envelope: &Envelope) -> Result<(), CommError> {
        for (linear, inbox) in self.inboxes.iter().enumerate() {
            inbox
                .send(envelope.clone())
                .map_err(|_| CommError::Disconnected {
                    endpoint: format!("inbox of block #{linear}"),
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn null_message_has_no_direction() {
        let m = GhostMessage::null(BlockIndex { ix: 0, iy: 0, iz: 0 }, CycleId(2));
        assert!(m.is_null());
        assert!(m.payload.is_empty());
        assert_eq!(Envelope::Ghost(m).kind(), "null ghost message");
    }

    #[test]
    fn send_routes_by_linear_position() {
        let extents = BlockExtents::new(2, 2, 1).unwrap();
        let (txs, rxs): (Vec<_>, Vec<_>) = (0..4).map(|_| unbounded()).unzip();
        let peers = PeerDirectory::new(extents, txs);
        let target = extents.index(1, 1, 0).unwrap();
        let msg = Envelope::Ghost(GhostMessage::null(target, CycleId(0)));
        peers.send(target, msg.clone()).unwrap();
        assert_eq!(rxs[3].try_recv().unwrap(), msg);
        assert!(rxs[0].try_recv().is_err());
    }

    #[test]
    fn send_to_dropped_inbox_is_disconnected() {
        let extents = BlockExtents::new(1, 1, 1).unwrap();
        let (tx, rx) = unbounded();
        drop(rx);
        let peers = PeerDirectory::new(extents, vec![tx]);
        let target = extents.index(0, 0, 0).unwrap();
        let err = peers
            .send(target, Envelope::Ghost(GhostMessage::null(target, CycleId(0))))
            .unwrap_err();
        assert!(matches!(err, CommError::Disconnected { .. }));
    }

    #[test]
    fn broadcast_reaches_everyone() {
        let extents = BlockExtents::new(3, 1, 1).unwrap();
        let (txs, rxs): (Vec<_>, Vec<_>) = (0..3).map(|_| unbounded()).unzip();
        let peers = PeerDirectory::new(extents, txs);
        let env = Envelope::Reduced {
            cycle: CycleId(1),
            result: ReductionResult::identity(),
        };
        peers.broadcast(&env).unwrap();
        for rx in &rxs {
            assert_eq!(rx.try_recv().unwrap(), env);
        }
    }
}
