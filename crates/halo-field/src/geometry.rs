//! Physical extents of blocks within the domain.

use halo_core::{Axis, BlockExtents, BlockIndex, CellCounts};

/// Axis-aligned physical bounds of the whole domain split evenly into
/// blocks and cells.
///
/// Every block has the same width along an axis: `(upper - lower) / n`
/// where `n` is the block count along that axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockGeometry {
    lower: [f64; 3],
    upper: [f64; 3],
    extents: BlockExtents,
    cells: CellCounts,
}

impl BlockGeometry {
    /// Domain from `lower` to `upper`.
    ///
    /// Bounds are not checked here; callers validate that
    /// `lower < upper` on every axis before building actors.
    pub fn new(lower: [f64; 3], upper: [f64; 3], extents: BlockExtents, cells: CellCounts) -> Self {
        Self {
            lower,
            upper,
            extents,
            cells,
        }
    }

    /// Unit cube `[0, 1]^3`.
    pub fn unit(extents: BlockExtents, cells: CellCounts) -> Self {
        Self::new([0.0; 3], [1.0; 3], extents, cells)
    }

    /// Whether `lower < upper` on every axis and all bounds are finite.
    pub fn is_valid(&self) -> bool {
        Axis::ALL.into_iter().all(|a| {
            let (lo, hi) = (self.lower[a.index()], self.upper[a.index()]);
            lo.is_finite() && hi.is_finite() && lo < hi
        })
    }

    /// Domain lower corner.
    pub fn domain_lower(&self) -> [f64; 3] {
        self.lower
    }

    /// Domain upper corner.
    pub fn domain_upper(&self) -> [f64; 3] {
        self.upper
    }

    /// Width of one block along each axis.
    pub fn block_width(&self) -> [f64; 3] {
        Axis::ALL.map(|a| {
            (self.upper[a.index()] - self.lower[a.index()]) / f64::from(self.extents.get(a))
        })
    }

    /// Width of one cell along each axis.
    pub fn cell_width(&self) -> [f64; 3] {
        let w = self.block_width();
        Axis::ALL.map(|a| w[a.index()] / self.cells.get(a) as f64)
    }

    /// Lower corner of the block at `index`.
    pub fn block_lower(&self, index: BlockIndex) -> [f64; 3] {
        let w = self.block_width();
        Axis::ALL.map(|a| self.lower[a.index()] + f64::from(index.get(a)) * w[a.index()])
    }

    /// Upper corner of the block at `index`.
    pub fn block_upper(&self, index: BlockIndex) -> [f64; 3] {
        let w = self.block_width();
        Axis::ALL.map(|a| self.lower[a.index()] + f64::from(index.get(a) + 1) * w[a.index()])
    }

    /// Center of interior cell `(i, j, k)` of the block at `index`.
    pub fn cell_center(&self, index: BlockIndex, i: isize, j: isize, k: isize) -> [f64; 3] {
        let lo = self.block_lower(index);
        let h = self.cell_width();
        let c = [i, j, k];
        Axis::ALL.map(|a| lo[a.index()] + (c[a.index()] as f64 + 0.5) * h[a.index()])
    }
}
