//! Domain assembly and the two drivers.
//!
//! [`Domain::new`] validates a [`DomainConfig`], builds one topology,
//! field block and inbox per block, and wires every actor to a single
//! [`ReductionCoordinator`].
//!
//! - [`Domain::run_threaded`] spawns one OS thread per actor plus one for
//!   the coordinator. The first failure drops the shared shutdown sender,
//!   which wakes every waiting thread; all threads are joined before the
//!   root-cause error is returned.
//! - [`Domain::run_lockstep`] steps actors round-robin on the calling
//!   thread. Same inputs, same message order, same results.

use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Sender};
use log::{debug, error, info};

use halo_core::{BlockIndex, CommError};
use halo_field::FieldBlock;
use halo_method::Collaborators;
use halo_topology::BlockTopology;

use crate::actor::{BlockActor, BlockReport, BlockState};
use crate::config::{ConfigError, DomainConfig};
use crate::message::PeerDirectory;
use crate::metrics::BlockMetrics;
use crate::reduction::{CycleRecord, ReductionCoordinator};

// ── RunError ───────────────────────────────────────────────────────

/// Why a run did not complete.
#[derive(Debug, PartialEq)]
pub enum RunError {
    /// The driver could not be set up.
    Config(ConfigError),
    /// A block or the coordinator hit a fatal protocol error.
    Comm(CommError),
    /// A worker thread panicked.
    ThreadPanicked {
        /// Name of the thread.
        name: String,
    },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Comm(e) => write!(f, "comm: {e}"),
            Self::ThreadPanicked { name } => write!(f, "thread '{name}' panicked"),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Comm(e) => Some(e),
            Self::ThreadPanicked { .. } => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CommError> for RunError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

// ── RunReport ──────────────────────────────────────────────────────

/// Result of a completed run.
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Final state of every block, in linear order.
    pub blocks: Vec<BlockReport>,
    /// Every completed reduction, oldest first.
    pub history: Vec<CycleRecord>,
}

impl RunReport {
    /// Number of cycles computed.
    pub fn cycles(&self) -> u64 {
        self.history.len() as u64
    }

    /// Report for the block at `index`.
    pub fn block(&self, index: BlockIndex) -> Option<&BlockReport> {
        self.blocks.iter().find(|b| b.index == index)
    }

    /// Counters summed over every block.
    pub fn totals(&self) -> BlockMetrics {
        let mut total = BlockMetrics::default();
        for b in &self.blocks {
            total.merge(&b.metrics);
        }
        total
    }
}

// ── Domain ─────────────────────────────────────────────────────────

/// A fully wired set of block actors and their coordinator.
pub struct Domain {
    config: DomainConfig,
    actors: Vec<BlockActor>,
    coordinator: ReductionCoordinator,
}

enum Outcome {
    Block(usize, Result<BlockReport, CommError>),
    Reduction(Result<Vec<CycleRecord>, CommError>),
    Panicked(String),
}

type Job = Box<dyn FnOnce() -> Outcome + Send>;

impl Domain {
    /// Build a domain, calling `init` once per block to set initial
    /// interior values.
    pub fn new(
        config: DomainConfig,
        collab: Collaborators,
        init: impl Fn(BlockIndex, &mut FieldBlock),
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let extents = config.extents;
        let geometry = config.geometry();

        let (inbox_tx, inbox_rx): (Vec<_>, Vec<_>) =
            (0..extents.block_count()).map(|_| unbounded()).unzip();
        let peers = PeerDirectory::new(extents, inbox_tx);
        let (contrib_tx, contrib_rx) = unbounded();

        let mut actors = Vec::with_capacity(extents.block_count());
        for (index, inbox) in extents.iter().zip(inbox_rx) {
            let topology = BlockTopology::new(
                index,
                extents,
                config.cells,
                config.periodicity,
                config.refresh,
            )?;
            let mut field = FieldBlock::new(config.cells, config.ghost_depth, config.field_count)?;
            init(index, &mut field);
            debug!(
                "block {index}: {} active directions, quorum {}",
                topology.face_set().len(),
                topology.quorum()
            );
            let actor = BlockActor::new(
                topology,
                field,
                geometry,
                collab.clone(),
                peers.clone(),
                inbox,
                contrib_tx.clone(),
            )
            .with_liveness_timeout(config.liveness_timeout)
            .with_max_cycles(config.max_cycles);
            actors.push(actor);
        }

        info!(
            "domain built: {:?} blocks of {:?} cells, ghost depth {}, {} fields",
            extents.to_array(),
            config.cells.to_array(),
            config.ghost_depth,
            config.field_count
        );
        Ok(Self {
            config,
            actors,
            coordinator: ReductionCoordinator::new(contrib_rx, peers),
        })
    }

    /// The validated configuration.
    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Actors in linear order.
    pub fn actors(&self) -> &[BlockActor] {
        &self.actors
    }

    /// Number of blocks.
    pub fn block_count(&self) -> usize {
        self.actors.len()
    }

    /// Run every actor on its own thread until the domain stops.
    pub fn run_threaded(self) -> Result<RunReport, RunError> {
        let Self {
            actors,
            coordinator,
            ..
        } = self;
        let n = actors.len();
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        let (outcome_tx, outcome_rx) = unbounded::<Outcome>();

        let mut jobs: Vec<(String, Job)> = Vec::with_capacity(n + 1);
        let coordinator = coordinator.with_shutdown(shutdown_rx.clone());
        jobs.push((
            "halo-reduce".into(),
            Box::new(move || Outcome::Reduction(coordinator.run())),
        ));
        for (linear, actor) in actors.into_iter().enumerate() {
            let actor = actor.with_shutdown(shutdown_rx.clone());
            jobs.push((
                format!("halo-block-{linear}"),
                Box::new(move || Outcome::Block(linear, actor.run())),
            ));
        }
        drop(shutdown_rx);

        let mut handles: Vec<JoinHandle<()>> = Vec::with_capacity(jobs.len());
        let mut spawn_error = None;
        for (name, job) in jobs {
            match spawn(name.clone(), job, outcome_tx.clone()) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    spawn_error = Some(ConfigError::ThreadSpawnFailed {
                        reason: format!("{name}: {e}"),
                    });
                    break;
                }
            }
        }
        drop(outcome_tx);

        let mut shutdown_tx = Some(shutdown_tx);
        if let Some(err) = spawn_error {
            error!("{err}; shutting down");
            shutdown_tx.take();
            join_all(handles);
            return Err(err.into());
        }

        let mut blocks: Vec<Option<BlockReport>> = (0..n).map(|_| None).collect();
        let mut history = None;
        let mut failures: Vec<RunError> = Vec::new();
        for outcome in outcome_rx.iter() {
            let failure = match outcome {
                Outcome::Block(linear, Ok(report)) => {
                    blocks[linear] = Some(report);
                    continue;
                }
                Outcome::Reduction(Ok(records)) => {
                    history = Some(records);
                    continue;
                }
                Outcome::Block(_, Err(e)) | Outcome::Reduction(Err(e)) => RunError::Comm(e),
                Outcome::Panicked(name) => RunError::ThreadPanicked { name },
            };
            if shutdown_tx.take().is_some() {
                error!("run failed: {failure}; shutting down");
            } else {
                debug!("secondary failure: {failure}");
            }
            failures.push(failure);
        }
        join_all(handles);

        if let Some(root) = root_cause(failures) {
            return Err(root);
        }
        let blocks = blocks
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CommError::Disconnected {
                endpoint: "block worker".into(),
            })?;
        let history = history.ok_or_else(|| CommError::Disconnected {
            endpoint: "reduction coordinator".into(),
        })?;
        info!("threaded run finished after {} cycles", history.len());
        Ok(RunReport { blocks, history })
    }

    /// Run every actor on the calling thread, round-robin in linear
    /// order, until the domain stops.
    ///
    /// Fails with [`CommError::Stalled`] if a full pass makes no progress.
    pub fn run_lockstep(self) -> Result<RunReport, RunError> {
        let Self {
            mut actors,
            mut coordinator,
            ..
        } = self;
        if let Err(e) = lockstep(&mut actors, &mut coordinator) {
            error!("lockstep run failed: {e}");
            return Err(e.into());
        }
        let history = coordinator.into_history();
        info!("lockstep run finished after {} cycles", history.len());
        Ok(RunReport {
            blocks: actors.into_iter().map(BlockActor::into_report).collect(),
            history,
        })
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("config", &self.config)
            .field("blocks", &self.actors.len())
            .finish_non_exhaustive()
    }
}

fn spawn(name: String, job: Job, outcomes: Sender<Outcome>) -> std::io::Result<JoinHandle<()>> {
    let label = name.clone();
    thread::Builder::new().name(name).spawn(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or(Outcome::Panicked(label));
        let _ = outcomes.send(outcome);
    })
}

fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.join();
    }
}

/// First failure that is not a mere consequence of another: hang-ups
/// follow the peer that failed first.
fn root_cause(failures: Vec<RunError>) -> Option<RunError> {
    let secondary = |e: &RunError| matches!(e, RunError::Comm(CommError::Disconnected { .. }));
    let index = failures.iter().position(|e| !secondary(e)).unwrap_or(0);
    failures.into_iter().nth(index)
}

fn lockstep(
    actors: &mut [BlockActor],
    coordinator: &mut ReductionCoordinator,
) -> Result<(), CommError> {
    loop {
        let mut progressed = false;
        for actor in actors.iter_mut() {
            while actor.try_step()? {
                progressed = true;
            }
        }
        progressed |= coordinator.drain()?;

        let live = actors.iter().filter(|a| a.state() != BlockState::Terminated);
        let Some(cycle) = live.map(BlockActor::cycle).min() else {
            return Ok(());
        };
        if !progressed {
            return Err(CommError::Stalled { cycle });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::{BlockExtents, CellCounts, CycleId, Periodicity};
    use halo_method::MethodList;
    use halo_test_utils::fixtures::{collaborators, marker_init};

    fn config(extents: [u32; 3], cells: usize) -> DomainConfig {
        DomainConfig {
            periodicity: Periodicity::all(),
            ..DomainConfig::new(
                BlockExtents::new(extents[0], extents[1], extents[2]).unwrap(),
                CellCounts::cube(cells).unwrap(),
            )
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let cfg = DomainConfig {
            field_count: 0,
            ..config([1, 1, 1], 4)
        };
        let err = Domain::new(cfg, collaborators(0.1, 1, MethodList::new()), |_, _| {}).unwrap_err();
        assert_eq!(err, ConfigError::NoFields);
    }

    #[test]
    fn zero_cell_literal_is_rejected_before_building() {
        let cfg = DomainConfig {
            cells: CellCounts {
                nx: 0,
                ny: 4,
                nz: 4,
            },
            ..config([2, 1, 1], 4)
        };
        let err = Domain::new(cfg, collaborators(0.1, 1, MethodList::new()), |_, _| {}).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Topology(halo_core::TopologyError::ZeroCells { .. })
        ));
    }

    #[test]
    fn builds_one_actor_per_block() {
        let cfg = config([2, 3, 1], 4);
        let extents = cfg.extents;
        let domain = Domain::new(cfg, collaborators(0.1, 1, MethodList::new()), marker_init(extents)).unwrap();
        assert_eq!(domain.block_count(), 6);
        for (linear, actor) in domain.actors().iter().enumerate() {
            assert_eq!(actor.linear(), linear);
            assert_eq!(actor.state(), BlockState::Prepare);
        }
    }

    #[test]
    fn lockstep_runs_requested_cycles() {
        let cfg = config([2, 1, 1], 4);
        let domain = Domain::new(cfg, collaborators(0.25, 3, MethodList::new()), |_, _| {}).unwrap();
        let report = domain.run_lockstep().unwrap();
        assert_eq!(report.cycles(), 4);
        for b in &report.blocks {
            assert_eq!(b.cycle, CycleId(4));
            assert!((b.time - 1.0).abs() < 1e-12);
        }
        assert!(report.history.last().unwrap().result.global_stop);
    }

    #[test]
    fn root_cause_prefers_non_hangup() {
        let failures = vec![
            RunError::Comm(CommError::Disconnected {
                endpoint: "x".into(),
            }),
            RunError::Comm(CommError::Stalled { cycle: CycleId(2) }),
        ];
        assert_eq!(
            root_cause(failures),
            Some(RunError::Comm(CommError::Stalled { cycle: CycleId(2) }))
        );
        let only_hangups = vec![RunError::Comm(CommError::Disconnected {
            endpoint: "y".into(),
        })];
        assert!(matches!(
            root_cause(only_hangups),
            Some(RunError::Comm(CommError::Disconnected { .. }))
        ));
        assert_eq!(root_cause(Vec::new()), None);
    }

    #[test]
    fn run_error_display_and_source() {
        let err = RunError::from(CommError::Stalled { cycle: CycleId(1) });
        assert!(err.to_string().contains("no block can make progress"));
        assert!(err.source().is_some());
        let err = RunError::ThreadPanicked {
            name: "halo-block-0".into(),
        };
        assert!(err.source().is_none());
    }
}
