//! Neighbor index arithmetic and domain-boundary classification.

use halo_core::{Axis, BlockExtents, BlockIndex, Direction, Face, Periodicity};
use smallvec::SmallVec;

/// Resolve a single axis value under periodic or open boundaries.
///
/// Returns `Some(wrapped)` for in-range or periodic values, `None` when
/// an open axis is left.
pub(crate) fn resolve_axis(val: i64, len: u32, periodic: bool) -> Option<u32> {
    let n = len as i64;
    if (0..n).contains(&val) {
        return Some(val as u32);
    }
    if periodic {
        Some(val.rem_euclid(n) as u32)
    } else {
        None
    }
}

/// The block one step along `direction` from `index`.
///
/// On a periodic axis the offset wraps modulo the extent; on an open axis
/// stepping outside `[0, n)` yields `None`. With one block along a
/// periodic axis the neighbor along that axis is the block itself.
///
/// # Examples
///
/// ```
/// use halo_core::{BlockExtents, Direction, Periodicity};
/// use halo_topology::neighbor;
///
/// let extents = BlockExtents::new(4, 4, 4).unwrap();
/// let origin = extents.index(0, 0, 0).unwrap();
/// let west = Direction::new(-1, 0, 0).unwrap();
///
/// assert_eq!(neighbor(origin, west, extents, Periodicity::none()), None);
/// let wrapped = neighbor(origin, west, extents, Periodicity::all()).unwrap();
/// assert_eq!(wrapped, extents.index(3, 0, 0).unwrap());
/// ```
pub fn neighbor(
    index: BlockIndex,
    direction: Direction,
    extents: BlockExtents,
    periodicity: Periodicity,
) -> Option<BlockIndex> {
    let mut out = [0u32; 3];
    for axis in Axis::ALL {
        let i = axis.index();
        let val = index.get(axis) as i64 + direction.component(axis) as i64;
        out[i] = resolve_axis(val, extents.get(axis), periodicity.axis(axis))?;
    }
    Some(BlockIndex {
        ix: out[0],
        iy: out[1],
        iz: out[2],
    })
}

/// Which faces of a block lie on the domain boundary.
///
/// Indexed `[axis][face]`: `lower` is `index == 0`, `upper` is
/// `index == n - 1`. A single block along an axis is on both faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BoundaryFlags(pub [[bool; 2]; 3]);

impl BoundaryFlags {
    /// Whether `face` along `axis` is on the domain boundary.
    pub fn is(&self, axis: Axis, face: Face) -> bool {
        self.0[axis.index()][face.index()]
    }

    /// Whether stepping `d` (`-1`, `0`, `+1`) along `axis` leaves the domain.
    ///
    /// A zero component never leaves.
    pub fn crosses(&self, axis: Axis, d: i8) -> bool {
        match Face::from_component(d) {
            Some(face) => self.is(axis, face),
            None => false,
        }
    }

    /// Number of axes on which at least one face is on the boundary.
    pub fn boundary_axes(&self) -> usize {
        self.0.iter().filter(|faces| faces[0] || faces[1]).count()
    }
}

/// Classify `index` against the domain boundary along each axis.
pub fn is_boundary(index: BlockIndex, extents: BlockExtents) -> BoundaryFlags {
    let mut flags = [[false; 2]; 3];
    for axis in Axis::ALL {
        let i = index.get(axis);
        let n = extents.get(axis);
        flags[axis.index()] = [i == 0, i + 1 == n];
    }
    BoundaryFlags(flags)
}

/// Every resolvable neighbor of `index`, in [`Direction::ALL`] order.
///
/// Directions that leave an open axis are omitted. Duplicated targets
/// (small periodic domains) are kept: each direction is a distinct
/// exchange even when two directions reach the same block.
pub fn neighbors(
    index: BlockIndex,
    extents: BlockExtents,
    periodicity: Periodicity,
) -> SmallVec<[(Direction, BlockIndex); 26]> {
    Direction::ALL
        .iter()
        .filter_map(|&d| neighbor(index, d, extents, periodicity).map(|n| (d, n)))
        .collect()
}
