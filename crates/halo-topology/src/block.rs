//! Per-block topology cache.

use halo_core::{
    Axis, BlockExtents, BlockIndex, CellCounts, Direction, Face, Periodicity, RefreshClass,
    TopologyError,
};
use smallvec::SmallVec;

use crate::face_set::FaceSet;
use crate::refresh::RefreshCounter;
use crate::topology::{is_boundary, neighbor, BoundaryFlags};

/// Everything a block needs to know about its place in the domain.
///
/// Topology is static once a block exists, so this is computed exactly
/// once, at actor construction, and never recomputed per cycle.
#[derive(Clone, Debug)]
pub struct BlockTopology {
    index: BlockIndex,
    extents: BlockExtents,
    cells: CellCounts,
    periodicity: Periodicity,
    refresh: RefreshClass,
    boundary: BoundaryFlags,
    face_set: FaceSet,
    counter: RefreshCounter,
    targets: SmallVec<[(Direction, BlockIndex); 26]>,
}

impl BlockTopology {
    /// Build the cache for the block at `index`.
    ///
    /// Fails if `index` is outside `extents` or an active direction has no
    /// resolvable neighbor. The second case is unreachable for consistent
    /// inputs; it is checked here so that a broken invariant stops the
    /// block at construction instead of deadlocking a peer later.
    pub fn new(
        index: BlockIndex,
        extents: BlockExtents,
        cells: CellCounts,
        periodicity: Periodicity,
        refresh: RefreshClass,
    ) -> Result<Self, TopologyError> {
        let index = extents.index(index.ix, index.iy, index.iz)?;
        let boundary = is_boundary(index, extents);
        let face_set = FaceSet::determine(cells, periodicity, boundary, refresh);
        let mut targets = SmallVec::new();
        for direction in face_set.iter() {
            let target = neighbor(index, direction, extents, periodicity)
                .ok_or(TopologyError::MissingNeighbor { index, direction })?;
            targets.push((direction, target));
        }
        Ok(Self {
            index,
            extents,
            cells,
            periodicity,
            refresh,
            boundary,
            face_set,
            counter: RefreshCounter::new(&face_set),
            targets,
        })
    }

    /// This block's index.
    pub fn index(&self) -> BlockIndex {
        self.index
    }

    /// Domain extents.
    pub fn extents(&self) -> BlockExtents {
        self.extents
    }

    /// Local interior cell counts.
    pub fn cells(&self) -> CellCounts {
        self.cells
    }

    /// Domain periodicity.
    pub fn periodicity(&self) -> Periodicity {
        self.periodicity
    }

    /// Configured refresh class.
    pub fn refresh(&self) -> RefreshClass {
        self.refresh
    }

    /// Domain-boundary classification.
    pub fn boundary(&self) -> BoundaryFlags {
        self.boundary
    }

    /// Active directions.
    pub fn face_set(&self) -> &FaceSet {
        &self.face_set
    }

    /// Inbound messages expected per cycle, self included.
    pub fn quorum(&self) -> usize {
        self.counter.quorum()
    }

    /// Per-class breakdown of the quorum.
    pub fn counter(&self) -> RefreshCounter {
        self.counter
    }

    /// `(direction, neighbor)` for every active direction, in canonical order.
    pub fn targets(&self) -> &[(Direction, BlockIndex)] {
        &self.targets
    }

    /// Faces on which boundary conditions must be enforced locally.
    ///
    /// A face qualifies when its axis carries a ghost layer, the block
    /// sits on the domain boundary there, and the axis does not wrap.
    pub fn boundary_faces(&self) -> impl Iterator<Item = (Axis, Face)> + '_ {
        Axis::ALL.into_iter().flat_map(move |axis| {
            Face::ALL.into_iter().filter_map(move |face| {
                let enforce = self.cells.exchanges(axis)
                    && self.boundary.is(axis, face)
                    && !self.periodicity.axis(axis);
                enforce.then_some((axis, face))
            })
        })
    }

    /// Whether any active direction leads back to this block.
    ///
    /// Happens only with a single block along a periodic axis.
    pub fn couples_with_self(&self) -> bool {
        self.targets.iter().any(|(_, t)| *t == self.index)
    }
}
