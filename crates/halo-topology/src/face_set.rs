//! Active-direction determination.
//!
//! A block exchanges ghost data along a direction only if every axis the
//! direction moves along carries a ghost layer and either wraps or still
//! has a block on the far side, and the direction's neighbor class is
//! enabled by the configured [`RefreshClass`].

use std::fmt;

use halo_core::{Axis, CellCounts, Direction, NeighborClass, Periodicity, RefreshClass};

use crate::topology::BoundaryFlags;

/// A set of directions, stored as a bitmask over [`Direction::ordinal`].
///
/// Iteration always follows [`Direction::ALL`] order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FaceSet {
    bits: u32,
}

impl FaceSet {
    /// The empty set.
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// All 26 directions.
    pub fn full() -> Self {
        Self {
            bits: (1 << Direction::ALL.len()) - 1,
        }
    }

    /// Decide which directions a block must exchange with.
    ///
    /// A direction is active iff, for every non-zero component `d` along
    /// axis `a`:
    /// - `cells[a] > 1` (a single-cell axis has no ghost layer), and
    /// - `periodicity[a]` holds, or the block is not on the domain
    ///   boundary on the side `d` points at;
    ///
    /// and `refresh` enables the direction's neighbor class.
    ///
    /// # Examples
    ///
    /// ```
    /// use halo_core::{BlockExtents, CellCounts, Periodicity, RefreshClass};
    /// use halo_topology::{is_boundary, FaceSet};
    ///
    /// let extents = BlockExtents::new(3, 3, 3).unwrap();
    /// let cells = CellCounts::cube(8).unwrap();
    /// let corner = is_boundary(extents.index(0, 0, 0).unwrap(), extents);
    ///
    /// let open = FaceSet::determine(cells, Periodicity::none(), corner, RefreshClass::FACE_ONLY);
    /// assert_eq!(open.len(), 3);
    /// let torus = FaceSet::determine(cells, Periodicity::all(), corner, RefreshClass::FACE_ONLY);
    /// assert_eq!(torus.len(), 6);
    /// ```
    pub fn determine(
        cells: CellCounts,
        periodicity: Periodicity,
        boundary: BoundaryFlags,
        refresh: RefreshClass,
    ) -> Self {
        let mut set = Self::empty();
        for d in Direction::ALL {
            if !refresh.enables(d.class()) {
                continue;
            }
            let active = Axis::ALL.into_iter().all(|axis| {
                let c = d.component(axis);
                c == 0
                    || (cells.exchanges(axis)
                        && (periodicity.axis(axis) || !boundary.crosses(axis, c)))
            });
            if active {
                set.insert(d);
            }
        }
        set
    }

    /// Add a direction.
    pub fn insert(&mut self, d: Direction) {
        self.bits |= 1 << d.ordinal();
    }

    /// Whether `d` is in the set.
    pub fn contains(&self, d: Direction) -> bool {
        self.bits & (1 << d.ordinal()) != 0
    }

    /// Number of directions in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of directions of `class` in the set.
    pub fn count_class(&self, class: NeighborClass) -> usize {
        self.iter().filter(|d| d.class() == class).count()
    }

    /// Iterate in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |d| self.contains(*d))
    }

    /// Whether every direction of `self` is also in `other`.
    pub fn is_subset(&self, other: &FaceSet) -> bool {
        self.bits & !other.bits == 0
    }
}

impl fmt::Debug for FaceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
