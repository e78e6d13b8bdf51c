//! Views of a block handed to collaborators.
//!
//! [`BlockView`] is a read-only snapshot used while deciding the timestep.
//! [`ComputeContext`] additionally grants mutable access to the field data
//! and is passed to each [`Method`](crate::Method) during the compute
//! phase.

use halo_core::{BlockIndex, CycleId};
use halo_field::{BlockGeometry, FieldBlock};

/// Read-only view of one block.
#[derive(Clone, Copy, Debug)]
pub struct BlockView<'a> {
    index: BlockIndex,
    cycle: CycleId,
    time: f64,
    dt: f64,
    field: &'a FieldBlock,
    geometry: &'a BlockGeometry,
}

impl<'a> BlockView<'a> {
    /// Construct a view. Normally called by the engine.
    pub fn new(
        index: BlockIndex,
        cycle: CycleId,
        time: f64,
        dt: f64,
        field: &'a FieldBlock,
        geometry: &'a BlockGeometry,
    ) -> Self {
        Self {
            index,
            cycle,
            time,
            dt,
            field,
            geometry,
        }
    }

    /// Block position in the domain.
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// Current cycle.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Timestep agreed in the previous cycle (zero before the first).
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Field data, ghosts included.
    pub fn field_block(&self) -> &'a FieldBlock {
        self.field
    }

    /// Domain geometry.
    pub fn geometry(&self) -> &'a BlockGeometry {
        self.geometry
    }

    /// Cell width of this block along each axis.
    pub fn cell_width(&self) -> [f64; 3] {
        self.geometry.cell_width()
    }
}

/// Mutable context for one compute hook invocation.
///
/// Ghost regions hold this cycle's neighbor data when a method runs;
/// methods write interior cells only.
pub struct ComputeContext<'a> {
    index: BlockIndex,
    cycle: CycleId,
    time: f64,
    dt: f64,
    field: &'a mut FieldBlock,
    geometry: &'a BlockGeometry,
}

impl<'a> ComputeContext<'a> {
    /// Construct a context. Normally called by the engine.
    pub fn new(
        index: BlockIndex,
        cycle: CycleId,
        time: f64,
        dt: f64,
        field: &'a mut FieldBlock,
        geometry: &'a BlockGeometry,
    ) -> Self {
        Self {
            index,
            cycle,
            time,
            dt,
            field,
            geometry,
        }
    }

    /// Block position in the domain.
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// Cycle being computed.
    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Simulation time at the start of the step.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Global timestep for this cycle.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Field data.
    pub fn field(&self) -> &FieldBlock {
        self.field
    }

    /// Field data, mutably.
    pub fn field_mut(&mut self) -> &mut FieldBlock {
        self.field
    }

    /// Domain geometry.
    pub fn geometry(&self) -> &BlockGeometry {
        self.geometry
    }

    /// Read-only view of the same block.
    pub fn view(&self) -> BlockView<'_> {
        BlockView::new(
            self.index,
            self.cycle,
            self.time,
            self.dt,
            self.field,
            self.geometry,
        )
    }
}
