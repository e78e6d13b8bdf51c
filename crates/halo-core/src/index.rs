//! Block indices, domain extents, and per-axis domain properties.

use std::fmt;

use crate::error::TopologyError;

/// One of the three spatial axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis (fastest-varying in linear block order).
    X,
    /// The y axis.
    Y,
    /// The z axis (slowest-varying in linear block order).
    Z,
}

impl Axis {
    /// All three axes in `x, y, z` order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in `[x, y, z]` arrays.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Lower or upper face of a block along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Face {
    /// The face at index 0 along the axis.
    Lower,
    /// The face at index `n - 1` along the axis.
    Upper,
}

impl Face {
    /// Both faces in `lower, upper` order.
    pub const ALL: [Face; 2] = [Face::Lower, Face::Upper];

    /// Position of this face in `[lower, upper]` arrays.
    pub fn index(self) -> usize {
        match self {
            Face::Lower => 0,
            Face::Upper => 1,
        }
    }

    /// The face a direction component of `-1` or `+1` points at.
    ///
    /// Returns `None` for a zero component.
    pub fn from_component(d: i8) -> Option<Face> {
        match d {
            -1 => Some(Face::Lower),
            1 => Some(Face::Upper),
            _ => None,
        }
    }

    /// The signed offset (`-1` or `+1`) this face points along its axis.
    pub fn sign(self) -> i8 {
        match self {
            Face::Lower => -1,
            Face::Upper => 1,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Lower => write!(f, "lower"),
            Face::Upper => write!(f, "upper"),
        }
    }
}

/// Position of a block within the 3-D block array.
///
/// Only constructible in-bounds through [`BlockExtents::index`] or
/// [`BlockExtents::delinear`]; the raw fields are public for pattern
/// matching and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex {
    /// Index along x.
    pub ix: u32,
    /// Index along y.
    pub iy: u32,
    /// Index along z.
    pub iz: u32,
}

impl BlockIndex {
    /// Component along `axis`.
    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.ix,
            Axis::Y => self.iy,
            Axis::Z => self.iz,
        }
    }

    /// Components as an `[x, y, z]` array.
    pub fn to_array(self) -> [u32; 3] {
        [self.ix, self.iy, self.iz]
    }
}

impl fmt::Display for BlockIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.ix, self.iy, self.iz)
    }
}

/// Number of blocks along each axis of the domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockExtents {
    nbx: u32,
    nby: u32,
    nbz: u32,
}

impl BlockExtents {
    /// Create extents of `nbx * nby * nbz` blocks.
    ///
    /// Returns `Err(TopologyError::EmptyDomain)` if any axis is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use halo_core::BlockExtents;
    ///
    /// let extents = BlockExtents::new(2, 3, 4).unwrap();
    /// assert_eq!(extents.block_count(), 24);
    /// assert!(BlockExtents::new(0, 1, 1).is_err());
    /// ```
    pub fn new(nbx: u32, nby: u32, nbz: u32) -> Result<Self, TopologyError> {
        if nbx == 0 || nby == 0 || nbz == 0 {
            return Err(TopologyError::EmptyDomain {
                extents: [nbx, nby, nbz],
            });
        }
        Ok(Self { nbx, nby, nbz })
    }

    /// A domain of exactly one block.
    pub fn single() -> Self {
        Self {
            nbx: 1,
            nby: 1,
            nbz: 1,
        }
    }

    /// Blocks along `axis`.
    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.nbx,
            Axis::Y => self.nby,
            Axis::Z => self.nbz,
        }
    }

    /// Extents as an `[x, y, z]` array.
    pub fn to_array(self) -> [u32; 3] {
        [self.nbx, self.nby, self.nbz]
    }

    /// Total number of blocks.
    pub fn block_count(&self) -> usize {
        self.nbx as usize * self.nby as usize * self.nbz as usize
    }

    /// Whether `(ix, iy, iz)` lies inside the domain.
    pub fn contains(&self, ix: u32, iy: u32, iz: u32) -> bool {
        ix < self.nbx && iy < self.nby && iz < self.nbz
    }

    /// Build a validated [`BlockIndex`].
    ///
    /// Enforces `0 <= i < n` along every axis.
    pub fn index(&self, ix: u32, iy: u32, iz: u32) -> Result<BlockIndex, TopologyError> {
        if !self.contains(ix, iy, iz) {
            return Err(TopologyError::IndexOutOfBounds {
                index: [ix, iy, iz],
                extents: self.to_array(),
            });
        }
        Ok(BlockIndex { ix, iy, iz })
    }

    /// Linear position of `index` (x fastest, then y, then z).
    pub fn linear(&self, index: BlockIndex) -> usize {
        let nx = self.nbx as usize;
        let ny = self.nby as usize;
        index.ix as usize + nx * (index.iy as usize + ny * index.iz as usize)
    }

    /// Inverse of [`linear`](Self::linear).
    pub fn delinear(&self, linear: usize) -> Result<BlockIndex, TopologyError> {
        if linear >= self.block_count() {
            return Err(TopologyError::LinearOutOfBounds {
                linear,
                block_count: self.block_count(),
            });
        }
        let nx = self.nbx as usize;
        let ny = self.nby as usize;
        Ok(BlockIndex {
            ix: (linear % nx) as u32,
            iy: ((linear / nx) % ny) as u32,
            iz: (linear / (nx * ny)) as u32,
        })
    }

    /// Every block index in linear order.
    pub fn iter(&self) -> impl Iterator<Item = BlockIndex> + '_ {
        (0..self.nbz).flat_map(move |iz| {
            (0..self.nby).flat_map(move |iy| (0..self.nbx).map(move |ix| BlockIndex { ix, iy, iz }))
        })
    }
}

impl fmt::Display for BlockExtents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.nbx, self.nby, self.nbz)
    }
}

/// Number of interior cells per block along each axis (ghosts excluded).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCounts {
    /// Cells along x.
    pub nx: usize,
    /// Cells along y.
    pub ny: usize,
    /// Cells along z.
    pub nz: usize,
}

impl CellCounts {
    /// Create cell counts, rejecting zero along any axis.
    pub fn new(nx: usize, ny: usize, nz: usize) -> Result<Self, TopologyError> {
        if nx == 0 || ny == 0 || nz == 0 {
            return Err(TopologyError::ZeroCells {
                cells: [nx, ny, nz],
            });
        }
        Ok(Self { nx, ny, nz })
    }

    /// Same count along all three axes.
    pub fn cube(n: usize) -> Result<Self, TopologyError> {
        Self::new(n, n, n)
    }

    /// Cells along `axis`.
    pub fn get(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.nx,
            Axis::Y => self.ny,
            Axis::Z => self.nz,
        }
    }

    /// Counts as an `[x, y, z]` array.
    pub fn to_array(self) -> [usize; 3] {
        [self.nx, self.ny, self.nz]
    }

    /// Interior cells in one block.
    pub fn total(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Whether `axis` carries a ghost layer (more than one cell).
    pub fn exchanges(&self, axis: Axis) -> bool {
        self.get(axis) > 1
    }
}

/// Per-axis periodic wraparound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Periodicity(pub [bool; 3]);

impl Periodicity {
    /// Periodic along every axis (3-torus).
    pub fn all() -> Self {
        Self([true; 3])
    }

    /// Periodic along no axis.
    pub fn none() -> Self {
        Self([false; 3])
    }

    /// Whether `axis` wraps.
    pub fn axis(&self, axis: Axis) -> bool {
        self.0[axis.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extents_reject_zero_axis() {
        assert!(matches!(
            BlockExtents::new(2, 0, 2),
            Err(TopologyError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn index_rejects_out_of_bounds() {
        let e = BlockExtents::new(2, 2, 2).unwrap();
        assert!(e.index(1, 1, 1).is_ok());
        assert!(matches!(
            e.index(2, 0, 0),
            Err(TopologyError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn linear_order_is_x_fastest() {
        let e = BlockExtents::new(3, 2, 2).unwrap();
        let order: Vec<_> = e.iter().collect();
        assert_eq!(order.len(), 12);
        assert_eq!(order[0], BlockIndex { ix: 0, iy: 0, iz: 0 });
        assert_eq!(order[1], BlockIndex { ix: 1, iy: 0, iz: 0 });
        assert_eq!(order[3], BlockIndex { ix: 0, iy: 1, iz: 0 });
        assert_eq!(order[6], BlockIndex { ix: 0, iy: 0, iz: 1 });
        for (i, idx) in order.iter().enumerate() {
            assert_eq!(e.linear(*idx), i);
        }
    }

    #[test]
    fn delinear_rejects_past_end() {
        let e = BlockExtents::new(2, 2, 1).unwrap();
        assert!(matches!(
            e.delinear(4),
            Err(TopologyError::LinearOutOfBounds { .. })
        ));
    }

    #[test]
    fn single_cell_axis_does_not_exchange() {
        let c = CellCounts::new(8, 1, 4).unwrap();
        assert!(c.exchanges(Axis::X));
        assert!(!c.exchanges(Axis::Y));
        assert!(c.exchanges(Axis::Z));
        assert!(CellCounts::new(0, 1, 1).is_err());
    }

    proptest! {
        #[test]
        fn linear_round_trips(nx in 1u32..6, ny in 1u32..6, nz in 1u32..6, seed in 0usize..1000) {
            let e = BlockExtents::new(nx, ny, nz).unwrap();
            let linear = seed % e.block_count();
            let idx = e.delinear(linear).unwrap();
            prop_assert!(e.contains(idx.ix, idx.iy, idx.iz));
            prop_assert_eq!(e.linear(idx), linear);
        }
    }
}
