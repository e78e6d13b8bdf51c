//! The per-block state machine.
//!
//! A [`BlockActor`] cycles through
//! `Prepare → AwaitReduction → RefreshBoundary → SendGhosts → AwaitGhosts
//! → Compute → (Prepare | Terminated)`.
//!
//! Ghost messages are counted the moment they arrive, whatever the
//! actor's state. Messages that arrive before `AwaitGhosts` are buffered
//! and unpacked on entry to it. Compute runs when the count reaches the
//! quorum derived from the block's topology. Each active direction and
//! the self message count at most once per cycle, and only from the
//! neighbor the topology resolved for that direction.

use std::fmt;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, select, Receiver, Sender, TryRecvError};
use log::{debug, trace};
use smallvec::SmallVec;

use halo_core::{
    BlockIndex, CommError, CycleId, ReductionContribution, ReductionResult,
};
use halo_field::{BlockGeometry, FieldBlock};
use halo_method::{candidate_timestep, BlockView, Collaborators, ComputeContext};
use halo_topology::{BlockTopology, FaceSet};

use crate::message::{Contribution, Envelope, GhostMessage, PeerDirectory};
use crate::metrics::BlockMetrics;

/// Where a block is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// Enforce boundaries, evaluate timestep and stop vote, contribute.
    Prepare,
    /// Waiting for this cycle's reduction result.
    AwaitReduction,
    /// Result received; about to refresh ghost data.
    RefreshBoundary,
    /// Packing and sending boundary layers.
    SendGhosts,
    /// Waiting for the ghost quorum.
    AwaitGhosts,
    /// Running compute methods.
    Compute,
    /// A stop result was received and the last cycle computed.
    Terminated,
}

impl BlockState {
    /// Stable name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Prepare => "Prepare",
            Self::AwaitReduction => "AwaitReduction",
            Self::RefreshBoundary => "RefreshBoundary",
            Self::SendGhosts => "SendGhosts",
            Self::AwaitGhosts => "AwaitGhosts",
            Self::Compute => "Compute",
            Self::Terminated => "Terminated",
        }
    }

    /// Whether the block is suspended on its inbox in this state.
    pub fn is_waiting(self) -> bool {
        matches!(self, Self::AwaitReduction | Self::AwaitGhosts)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Final state of one block after a run.
#[derive(Clone, Debug)]
pub struct BlockReport {
    /// Block position.
    pub index: BlockIndex,
    /// Cycles completed (the next cycle the block would have run).
    pub cycle: CycleId,
    /// Simulation time reached.
    pub time: f64,
    /// Timestep of the last cycle.
    pub dt: f64,
    /// Protocol counters.
    pub metrics: BlockMetrics,
    /// Field data, ghosts included.
    pub field: FieldBlock,
}

/// One mesh block and its protocol state.
pub struct BlockActor {
    topology: BlockTopology,
    linear: usize,
    field: FieldBlock,
    geometry: BlockGeometry,
    collab: Collaborators,
    peers: PeerDirectory,
    inbox: Receiver<Envelope>,
    contributions: Sender<Contribution>,
    shutdown: Receiver<()>,
    liveness_timeout: Option<Duration>,
    max_cycles: Option<u64>,

    state: BlockState,
    cycle: CycleId,
    time: f64,
    dt: f64,
    arrivals: usize,
    received: FaceSet,
    self_received: bool,
    pending: SmallVec<[GhostMessage; 8]>,
    result: Option<ReductionResult>,
    metrics: BlockMetrics,
    wait_started: Instant,
}

impl BlockActor {
    /// Actor for the block described by `topology`, starting in
    /// `Prepare` at cycle 0 and time 0.
    pub fn new(
        topology: BlockTopology,
        field: FieldBlock,
        geometry: BlockGeometry,
        collab: Collaborators,
        peers: PeerDirectory,
        inbox: Receiver<Envelope>,
        contributions: Sender<Contribution>,
    ) -> Self {
        let linear = topology.extents().linear(topology.index());
        Self {
            topology,
            linear,
            field,
            geometry,
            collab,
            peers,
            inbox,
            contributions,
            shutdown: never(),
            liveness_timeout: None,
            max_cycles: None,
            state: BlockState::Prepare,
            cycle: CycleId(0),
            time: 0.0,
            dt: 0.0,
            arrivals: 0,
            received: FaceSet::empty(),
            self_received: false,
            pending: SmallVec::new(),
            result: None,
            metrics: BlockMetrics::default(),
            wait_started: Instant::now(),
        }
    }

    /// Fail with [`CommError::LivenessTimeout`] after waiting this long
    /// for any single message.
    pub fn with_liveness_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.liveness_timeout = timeout;
        self
    }

    /// Vote to stop once this many cycles have been computed.
    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Abort [`run`](Self::run) when the sender of `shutdown` is dropped.
    pub fn with_shutdown(mut self, shutdown: Receiver<()>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Block position.
    pub fn index(&self) -> BlockIndex {
        self.topology.index()
    }

    /// Linear block position.
    pub fn linear(&self) -> usize {
        self.linear
    }

    /// Current state.
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Current cycle.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Timestep agreed for the current (or last) cycle.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Ghost messages needed per cycle, self included.
    pub fn quorum(&self) -> usize {
        self.topology.quorum()
    }

    /// Ghost messages counted so far this cycle.
    pub fn arrivals(&self) -> usize {
        self.arrivals
    }

    /// Messages buffered until `AwaitGhosts`.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Cached topology.
    pub fn topology(&self) -> &BlockTopology {
        &self.topology
    }

    /// Field data.
    pub fn field(&self) -> &FieldBlock {
        &self.field
    }

    /// Protocol counters.
    pub fn metrics(&self) -> &BlockMetrics {
        &self.metrics
    }

    /// Last reduction result received.
    pub fn last_result(&self) -> Option<ReductionResult> {
        self.result
    }

    fn unexpected(&self, message: &'static str) -> CommError {
        CommError::UnexpectedMessage {
            block: self.index(),
            state: self.state.name(),
            message,
        }
    }

    fn check_cycle(&self, actual: CycleId) -> Result<(), CommError> {
        if actual != self.cycle {
            return Err(CommError::CycleMismatch {
                block: Some(self.index()),
                expected: self.cycle,
                actual,
            });
        }
        Ok(())
    }

    /// Run the prepare phase and submit this block's contribution.
    pub fn prepare(&mut self) -> Result<(), CommError> {
        if self.state != BlockState::Prepare {
            return Err(self.unexpected("prepare request"));
        }
        let index = self.index();
        for (axis, face) in self.topology.boundary_faces() {
            self.collab.boundary.enforce(&mut self.field, axis, face);
        }

        let view = BlockView::new(index, self.cycle, self.time, self.dt, &self.field, &self.geometry);
        let candidate_dt = candidate_timestep(&self.collab, &view);
        let limit_reached = self.max_cycles.is_some_and(|m| self.cycle.0 + 1 >= m);
        let stop = self.collab.stopping.complete(self.cycle, self.time) || limit_reached;
        let value = ReductionContribution { candidate_dt, stop };
        if !value.is_valid() {
            return Err(CommError::InvalidTimestep {
                block: self.linear,
                cycle: self.cycle,
                dt: candidate_dt,
            });
        }

        self.contributions
            .send(Contribution {
                block: self.linear,
                cycle: self.cycle,
                value,
            })
            .map_err(|_| CommError::Disconnected {
                endpoint: "reduction coordinator".into(),
            })?;
        trace!(
            "block {index} cycle {}: contributed dt={candidate_dt} stop={stop}",
            self.cycle
        );
        self.state = BlockState::AwaitReduction;
        self.wait_started = Instant::now();
        Ok(())
    }

    /// Process one inbound message.
    pub fn deliver(&mut self, envelope: Envelope) -> Result<(), CommError> {
        match envelope {
            Envelope::Ghost(msg) => self.receive_ghost(msg),
            Envelope::Reduced { cycle, result } => self.receive_result(cycle, result),
        }
    }

    fn receive_ghost(&mut self, msg: GhostMessage) -> Result<(), CommError> {
        if self.state == BlockState::Terminated {
            return Err(self.unexpected(Envelope::Ghost(msg).kind()));
        }
        self.check_cycle(msg.cycle)?;
        let expected = match msg.direction {
            Some(direction) => {
                if !self.topology.face_set().contains(direction) {
                    return Err(self.unexpected("ghost message for an inactive direction"));
                }
                self.topology
                    .targets()
                    .iter()
                    .find(|(d, _)| *d == direction)
                    .map(|&(_, target)| target)
            }
            None => Some(self.index()),
        };
        if expected != Some(msg.source) {
            return Err(CommError::WrongSource {
                block: self.index(),
                direction: msg.direction,
                sender: msg.source,
            });
        }
        self.arrivals += 1;
        if self.arrivals > self.quorum() {
            return Err(CommError::QuorumExceeded {
                block: self.index(),
                cycle: self.cycle,
                quorum: self.quorum(),
            });
        }
        let repeated = match msg.direction {
            Some(direction) => self.received.contains(direction),
            None => self.self_received,
        };
        if repeated {
            return Err(CommError::DuplicateGhost {
                block: self.index(),
                cycle: self.cycle,
                direction: msg.direction,
            });
        }
        match msg.direction {
            Some(direction) => self.received.insert(direction),
            None => self.self_received = true,
        }
        if !msg.is_null() {
            self.metrics.ghosts_received += 1;
            self.metrics.bytes_received += msg.payload.len() as u64;
        }

        if self.state == BlockState::AwaitGhosts {
            self.apply(&msg)?;
            return self.try_compute();
        }
        trace!(
            "block {} buffered early message from {} ({}/{})",
            self.index(),
            msg.source,
            self.arrivals,
            self.quorum()
        );
        self.metrics.early_arrivals += 1;
        self.pending.push(msg);
        Ok(())
    }

    fn apply(&mut self, msg: &GhostMessage) -> Result<(), CommError> {
        if let Some(direction) = msg.direction {
            self.field.unpack(direction, &msg.payload)?;
        }
        Ok(())
    }

    fn receive_result(&mut self, cycle: CycleId, result: ReductionResult) -> Result<(), CommError> {
        if self.state != BlockState::AwaitReduction {
            return Err(self.unexpected("reduction result"));
        }
        self.check_cycle(cycle)?;
        BlockMetrics::add_wait(&mut self.metrics.reduction_wait_us, self.wait_started.elapsed());
        if !result.global_dt.is_finite() || result.global_dt < 0.0 {
            return Err(CommError::InvalidTimestep {
                block: self.linear,
                cycle,
                dt: result.global_dt,
            });
        }
        self.dt = result.global_dt;
        self.result = Some(result);

        self.state = BlockState::RefreshBoundary;
        self.send_ghosts()?;

        self.state = BlockState::AwaitGhosts;
        self.wait_started = Instant::now();
        let pending = std::mem::take(&mut self.pending);
        for msg in &pending {
            self.apply(msg)?;
        }
        self.try_compute()
    }

    fn send_ghosts(&mut self) -> Result<(), CommError> {
        self.state = BlockState::SendGhosts;
        let index = self.index();
        for &(direction, target) in self.topology.targets() {
            let payload = self.field.pack(direction);
            self.metrics.ghosts_sent += 1;
            self.metrics.bytes_sent += payload.len() as u64;
            let msg = GhostMessage::data(index, self.cycle, direction.inverse(), payload);
            self.peers.send(target, Envelope::Ghost(msg))?;
        }
        self.peers
            .send(index, Envelope::Ghost(GhostMessage::null(index, self.cycle)))
    }

    fn try_compute(&mut self) -> Result<(), CommError> {
        if self.state != BlockState::AwaitGhosts || self.arrivals < self.quorum() {
            return Ok(());
        }
        BlockMetrics::add_wait(&mut self.metrics.ghost_wait_us, self.wait_started.elapsed());
        self.compute()
    }

    fn compute(&mut self) -> Result<(), CommError> {
        self.state = BlockState::Compute;
        let index = self.index();
        let mut ctx = ComputeContext::new(
            index,
            self.cycle,
            self.time,
            self.dt,
            &mut self.field,
            &self.geometry,
        );
        self.collab.methods.compute(&mut ctx)?;

        self.cycle = self.cycle.next();
        self.time += self.dt;
        self.arrivals = 0;
        self.received = FaceSet::empty();
        self.self_received = false;
        self.metrics.cycles += 1;
        let stop = self.result.is_some_and(|r| r.global_stop);
        self.state = if stop {
            BlockState::Terminated
        } else {
            BlockState::Prepare
        };
        trace!(
            "block {index} finished cycle {} at t={}; next state {}",
            self.cycle.0 - 1,
            self.time,
            self.state
        );
        Ok(())
    }

    /// Wait for the next inbox message, honoring the liveness timeout and
    /// the driver's shutdown signal.
    fn wait(&self) -> Result<Envelope, CommError> {
        let timeout = self.liveness_timeout.map(after).unwrap_or_else(never);
        select! {
            recv(self.inbox) -> msg => msg.map_err(|_| CommError::Disconnected {
                endpoint: format!("inbox of block {}", self.index()),
            }),
            recv(self.shutdown) -> _ => Err(CommError::Disconnected {
                endpoint: "driver shutdown".into(),
            }),
            recv(timeout) -> _ => Err(CommError::LivenessTimeout {
                block: self.index(),
                state: self.state.name(),
                cycle: self.cycle,
            }),
        }
    }

    /// Make one unit of progress without blocking.
    ///
    /// Returns `false` when the actor is terminated or its inbox is empty
    /// while it waits.
    pub fn try_step(&mut self) -> Result<bool, CommError> {
        match self.state {
            BlockState::Prepare => {
                self.prepare()?;
                Ok(true)
            }
            BlockState::Terminated => Ok(false),
            _ => match self.inbox.try_recv() {
                Ok(envelope) => {
                    self.deliver(envelope)?;
                    Ok(true)
                }
                Err(TryRecvError::Empty) => Ok(false),
                Err(TryRecvError::Disconnected) => Err(CommError::Disconnected {
                    endpoint: format!("inbox of block {}", self.index()),
                }),
            },
        }
    }

    /// Drive the state machine until it terminates.
    pub fn run(mut self) -> Result<BlockReport, CommError> {
        debug!(
            "block {} starting: quorum {}, {} active directions",
            self.index(),
            self.quorum(),
            self.topology.face_set().len()
        );
        loop {
            match self.state {
                BlockState::Prepare => self.prepare()?,
                BlockState::Terminated => break,
                _ => {
                    let envelope = self.wait()?;
                    self.deliver(envelope)?;
                }
            }
        }
        debug!(
            "block {} terminated at cycle {} t={}",
            self.index(),
            self.cycle,
            self.time
        );
        Ok(self.into_report())
    }

    /// Consume the actor, returning its final state.
    pub fn into_report(self) -> BlockReport {
        BlockReport {
            index: self.topology.index(),
            cycle: self.cycle,
            time: self.time,
            dt: self.dt,
            metrics: self.metrics,
            field: self.field,
        }
    }
}

impl fmt::Debug for BlockActor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockActor")
            .field("index", &self.index())
            .field("state", &self.state)
            .field("cycle", &self.cycle)
            .field("time", &self.time)
            .field("arrivals", &self.arrivals)
            .field("quorum", &self.quorum())
            .finish_non_exhaustive()
    }
}
