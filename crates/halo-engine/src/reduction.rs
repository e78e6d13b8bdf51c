//! The per-cycle global reduction.
//!
//! [`CycleReducer`] is the pure accumulator: one contribution per live
//! block per cycle, folded with `min` / `OR`. [`ReductionCoordinator`]
//! wraps it with the contribution channel and broadcasts each completed
//! result to every block inbox.

use crossbeam_channel::{never, select, Receiver};
use log::{debug, info};

use halo_core::{CommError, CycleId, ReductionContribution, ReductionResult};

use crate::message::{Contribution, Envelope, PeerDirectory};

/// The outcome of one completed cycle reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleRecord {
    /// The reduced cycle.
    pub cycle: CycleId,
    /// The merged result every block received.
    pub result: ReductionResult,
}

/// Accumulates one cycle's contributions.
///
/// Completion requires exactly one contribution from each of the `live`
/// blocks; the reducer then resets itself for the following cycle.
#[derive(Clone, Debug)]
pub struct CycleReducer {
    live: usize,
    cycle: CycleId,
    seen: Vec<bool>,
    received: usize,
    acc: ReductionResult,
    history: Vec<CycleRecord>,
}

impl CycleReducer {
    /// Reducer over `live` blocks, starting at cycle 0.
    pub fn new(live: usize) -> Self {
        Self {
            live,
            cycle: CycleId(0),
            seen: vec![false; live],
            received: 0,
            acc: ReductionResult::identity(),
            history: Vec::new(),
        }
    }

    /// Cycle currently being collected.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Contributions received so far this cycle.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Completed cycles, oldest first.
    pub fn history(&self) -> &[CycleRecord] {
        &self.history
    }

    /// Consume the reducer, returning its history.
    pub fn into_history(self) -> Vec<CycleRecord> {
        self.history
    }

    /// Fold in `block`'s contribution for `cycle`.
    ///
    /// Returns the merged result once every live block has contributed.
    ///
    /// # Errors
    ///
    /// - [`CommError::UnknownBlock`] if `block >= live`.
    /// - [`CommError::CycleMismatch`] if `cycle` is not the cycle being
    ///   collected.
    /// - [`CommError::DuplicateContribution`] if `block` already
    ///   contributed this cycle.
    /// - [`CommError::InvalidTimestep`] if the candidate is NaN, infinite
    ///   or negative.
    pub fn contribute(
        &mut self,
        block: usize,
        cycle: CycleId,
        value: ReductionContribution,
    ) -> Result<Option<ReductionResult>, CommError> {
        if block >= self.live {
            return Err(CommError::UnknownBlock { block });
        }
        if cycle != self.cycle {
            return Err(CommError::CycleMismatch {
                block: None,
                expected: self.cycle,
                actual: cycle,
            });
        }
        if self.seen[block] {
            return Err(CommError::DuplicateContribution { block, cycle });
        }
        if !value.is_valid() {
            return Err(CommError::InvalidTimestep {
                block,
                cycle,
                dt: value.candidate_dt,
            });
        }
        self.seen[block] = true;
        self.received += 1;
        self.acc = self.acc.merge(value);
        if self.received < self.live {
            return Ok(None);
        }

        let result = self.acc;
        self.history.push(CycleRecord { cycle, result });
        self.cycle = cycle.next();
        self.seen.fill(false);
        self.received = 0;
        self.acc = ReductionResult::identity();
        Ok(Some(result))
    }
}

/// Receives contributions and broadcasts merged results.
pub struct ReductionCoordinator {
    reducer: CycleReducer,
    contributions: Receiver<Contribution>,
    peers: PeerDirectory,
    shutdown: Option<Receiver<()>>,
    finished: bool,
}

impl ReductionCoordinator {
    /// Coordinator for every block in `peers`.
    pub fn new(contributions: Receiver<Contribution>, peers: PeerDirectory) -> Self {
        Self {
            reducer: CycleReducer::new(peers.len()),
            contributions,
            peers,
            shutdown: None,
            finished: false,
        }
    }

    /// Abort [`run`](Self::run) when the sender of `shutdown` is dropped.
    pub fn with_shutdown(mut self, shutdown: Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Whether a result with the stop flag set has been broadcast.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The underlying reducer.
    pub fn reducer(&self) -> &CycleReducer {
        &self.reducer
    }

    /// Fold in one contribution, broadcasting the result if it completes
    /// the cycle.
    pub fn handle(&mut self, c: Contribution) -> Result<Option<ReductionResult>, CommError> {
        let Some(result) = self.reducer.contribute(c.block, c.cycle, c.value)? else {
            return Ok(None);
        };
        debug!(
            "cycle {} reduced: dt={} stop={}",
            c.cycle, result.global_dt, result.global_stop
        );
        self.peers.broadcast(&Envelope::Reduced {
            cycle: c.cycle,
            result,
        })?;
        if result.global_stop {
            self.finished = true;
        }
        Ok(Some(result))
    }

    /// Process every contribution already queued, without blocking.
    ///
    /// Returns whether anything was processed.
    pub fn drain(&mut self) -> Result<bool, CommError> {
        let mut progressed = false;
        while !self.finished {
            let Ok(c) = self.contributions.try_recv() else {
                break;
            };
            self.handle(c)?;
            progressed = true;
        }
        Ok(progressed)
    }

    /// Block until a stop result has been broadcast, then return the
    /// reduction history.
    pub fn run(mut self) -> Result<Vec<CycleRecord>, CommError> {
        let shutdown = self.shutdown.take().unwrap_or_else(never);
        let contributions = self.contributions.clone();
        while !self.finished {
            select! {
                recv(contributions) -> msg => {
                    let c = msg.map_err(|_| CommError::Disconnected {
                        endpoint: "contribution channel".into(),
                    })?;
                    self.handle(c)?;
                }
                recv(shutdown) -> _ => {
                    return Err(CommError::Disconnected {
                        endpoint: "driver shutdown".into(),
                    });
                }
            }
        }
        info!("reduction finished after {} cycles", self.reducer.history().len());
        Ok(self.reducer.into_history())
    }

    /// Consume the coordinator, returning its reduction history.
    pub fn into_history(self) -> Vec<CycleRecord> {
        self.reducer.into_history()
    }
}
