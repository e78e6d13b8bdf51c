//! Test utilities and mock collaborators for halo development.
//!
//! Provides recording and scripted implementations of the collaborator
//! traits in `halo-method`, plus [`fixtures`] for building domains whose
//! ghost exchange can be checked cell by cell.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::BTreeMap;
use std::sync::Mutex;

use halo_core::{Axis, BlockIndex, CycleId, Face, MethodError};
use halo_field::FieldBlock;
use halo_method::{Boundary, BlockView, ComputeContext, Method, Stopping, Timestep};

/// Boundary that leaves ghost cells untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopBoundary;

impl Boundary for NoopBoundary {
    fn enforce(&self, _block: &mut FieldBlock, _axis: Axis, _face: Face) {}
}

/// Boundary that records every `(axis, face)` it is asked to enforce.
#[derive(Debug, Default)]
pub struct RecordingBoundary {
    calls: Mutex<Vec<(Axis, Face)>>,
}

impl RecordingBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far, in call order.
    pub fn calls(&self) -> Vec<(Axis, Face)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Boundary for RecordingBoundary {
    fn enforce(&self, _block: &mut FieldBlock, axis: Axis, face: Face) {
        self.calls.lock().unwrap().push((axis, face));
    }
}

/// Timestep computed from the block index alone.
pub struct PerBlockTimestep {
    f: Box<dyn Fn(BlockIndex, CycleId) -> f64 + Send + Sync>,
}

impl PerBlockTimestep {
    pub fn new(f: impl Fn(BlockIndex, CycleId) -> f64 + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl Timestep for PerBlockTimestep {
    fn evaluate(&self, block: &BlockView<'_>) -> f64 {
        (self.f)(block.index(), block.cycle())
    }
}

/// Constant timestep.
#[derive(Clone, Copy, Debug)]
pub struct FixedDt(pub f64);

impl Timestep for FixedDt {
    fn evaluate(&self, _block: &BlockView<'_>) -> f64 {
        self.0
    }
}

/// Stops once `cycle >= self.0`, no time limit.
#[derive(Clone, Copy, Debug)]
pub struct StopAfterCycles(pub u64);

impl Stopping for StopAfterCycles {
    fn complete(&self, cycle: CycleId, _time: f64) -> bool {
        cycle.0 >= self.0
    }

    fn stop_time(&self) -> f64 {
        f64::INFINITY
    }
}

/// One `compute_block` invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComputeRecord {
    pub index: BlockIndex,
    pub cycle: CycleId,
    pub time: f64,
    pub dt: f64,
}

/// Method that records each invocation and changes nothing.
#[derive(Debug, Default)]
pub struct RecordingMethod {
    name: String,
    records: Mutex<Vec<ComputeRecord>>,
}

impl RecordingMethod {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded invocation, in the order they ran.
    pub fn records(&self) -> Vec<ComputeRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Invocations for `index`.
    pub fn records_for(&self, index: BlockIndex) -> Vec<ComputeRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.index == index)
            .collect()
    }
}

impl Method for RecordingMethod {
    fn name(&self) -> &str {
        &self.name
    }

    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
        self.records.lock().unwrap().push(ComputeRecord {
            index: ctx.index(),
            cycle: ctx.cycle(),
            time: ctx.time(),
            dt: ctx.dt(),
        });
        Ok(())
    }
}

/// Method that captures the whole field block, ghosts included, each
/// time it runs.
#[derive(Debug, Default)]
pub struct GhostSnapshot {
    snapshots: Mutex<BTreeMap<(BlockIndex, CycleId), FieldBlock>>,
}

impl GhostSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// The block as it looked when computing `cycle`.
    pub fn get(&self, index: BlockIndex, cycle: CycleId) -> Option<FieldBlock> {
        self.snapshots.lock().unwrap().get(&(index, cycle)).cloned()
    }

    /// Number of captured snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Method for GhostSnapshot {
    fn name(&self) -> &str {
        "ghost_snapshot"
    }

    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
        self.snapshots
            .lock()
            .unwrap()
            .insert((ctx.index(), ctx.cycle()), ctx.field().clone());
        Ok(())
    }
}

/// Method that fails on one block at one cycle.
#[derive(Clone, Copy, Debug)]
pub struct FailingMethod {
    pub block: BlockIndex,
    pub at_cycle: u64,
}

impl Method for FailingMethod {
    fn name(&self) -> &str {
        "failing"
    }

    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
        if ctx.index() == self.block && ctx.cycle().0 == self.at_cycle {
            return Err(MethodError::ExecutionFailed {
                reason: format!("scripted failure at cycle {}", self.at_cycle),
            });
        }
        Ok(())
    }
}
