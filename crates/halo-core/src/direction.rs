//! The 26 neighbor directions of a block and the refresh classes that gate them.

use std::fmt;

use crate::error::TopologyError;
use crate::index::{Axis, Face};

/// Classification of a direction by the Manhattan weight of its offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NeighborClass {
    /// Weight 1: shares a face.
    Face,
    /// Weight 2: shares an edge.
    Edge,
    /// Weight 3: shares a corner.
    Corner,
}

impl NeighborClass {
    /// Number of directions of this class among the 26.
    pub fn direction_count(self) -> usize {
        match self {
            NeighborClass::Face => 6,
            NeighborClass::Edge => 12,
            NeighborClass::Corner => 8,
        }
    }
}

/// A unit offset `(dx, dy, dz)` in `{-1, 0, 1}^3`, excluding the origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Direction {
    dx: i8,
    dy: i8,
    dz: i8,
}

const fn dir(dx: i8, dy: i8, dz: i8) -> Direction {
    Direction { dx, dy, dz }
}

impl Direction {
    /// All 26 directions, `dz` outermost and `dx` innermost.
    ///
    /// This order is the canonical iteration order everywhere a set of
    /// directions is enumerated, so that every block packs and sends in
    /// the same sequence.
    pub const ALL: [Direction; 26] = [
        dir(-1, -1, -1),
        dir(0, -1, -1),
        dir(1, -1, -1),
        dir(-1, 0, -1),
        dir(0, 0, -1),
        dir(1, 0, -1),
        dir(-1, 1, -1),
        dir(0, 1, -1),
        dir(1, 1, -1),
        dir(-1, -1, 0),
        dir(0, -1, 0),
        dir(1, -1, 0),
        dir(-1, 0, 0),
        dir(1, 0, 0),
        dir(-1, 1, 0),
        dir(0, 1, 0),
        dir(1, 1, 0),
        dir(-1, -1, 1),
        dir(0, -1, 1),
        dir(1, -1, 1),
        dir(-1, 0, 1),
        dir(0, 0, 1),
        dir(1, 0, 1),
        dir(-1, 1, 1),
        dir(0, 1, 1),
        dir(1, 1, 1),
    ];

    /// Create a direction, rejecting components outside `{-1, 0, 1}` and
    /// the zero offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use halo_core::{Direction, NeighborClass};
    ///
    /// let d = Direction::new(1, -1, 0).unwrap();
    /// assert_eq!(d.class(), NeighborClass::Edge);
    /// assert_eq!(d.inverse(), Direction::new(-1, 1, 0).unwrap());
    /// assert!(Direction::new(0, 0, 0).is_err());
    /// ```
    pub fn new(dx: i8, dy: i8, dz: i8) -> Result<Self, TopologyError> {
        let in_range = |d: i8| (-1..=1).contains(&d);
        if !in_range(dx) || !in_range(dy) || !in_range(dz) || (dx, dy, dz) == (0, 0, 0) {
            return Err(TopologyError::InvalidDirection {
                components: [dx, dy, dz],
            });
        }
        Ok(dir(dx, dy, dz))
    }

    /// The single-axis direction pointing at `face` along `axis`.
    pub fn face(axis: Axis, face: Face) -> Self {
        let mut c = [0i8; 3];
        c[axis.index()] = face.sign();
        dir(c[0], c[1], c[2])
    }

    /// Offset along x.
    pub fn dx(&self) -> i8 {
        self.dx
    }

    /// Offset along y.
    pub fn dy(&self) -> i8 {
        self.dy
    }

    /// Offset along z.
    pub fn dz(&self) -> i8 {
        self.dz
    }

    /// Offset along `axis`.
    pub fn component(&self, axis: Axis) -> i8 {
        match axis {
            Axis::X => self.dx,
            Axis::Y => self.dy,
            Axis::Z => self.dz,
        }
    }

    /// Offsets as an `[x, y, z]` array.
    pub fn to_array(self) -> [i8; 3] {
        [self.dx, self.dy, self.dz]
    }

    /// The opposite direction `(-dx, -dy, -dz)`.
    pub fn inverse(self) -> Self {
        dir(-self.dx, -self.dy, -self.dz)
    }

    /// Manhattan weight: number of non-zero components.
    pub fn weight(&self) -> u8 {
        (self.dx != 0) as u8 + (self.dy != 0) as u8 + (self.dz != 0) as u8
    }

    /// Face, edge, or corner, from [`weight`](Self::weight).
    pub fn class(&self) -> NeighborClass {
        match self.weight() {
            1 => NeighborClass::Face,
            2 => NeighborClass::Edge,
            _ => NeighborClass::Corner,
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    pub fn ordinal(&self) -> usize {
        let raw = (self.dx + 1) as usize + 3 * ((self.dy + 1) as usize + 3 * (self.dz + 1) as usize);
        // The origin (raw 13) is not in the table.
        if raw > 13 {
            raw - 1
        } else {
            raw
        }
    }

    /// Axes with a non-zero component, each paired with the face it points at.
    pub fn faces(&self) -> impl Iterator<Item = (Axis, Face)> + '_ {
        Axis::ALL
            .into_iter()
            .filter_map(move |axis| Face::from_component(self.component(axis)).map(|f| (axis, f)))
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+}, {:+}, {:+})", self.dx, self.dy, self.dz)
    }
}

/// Which neighbor classes are refreshed each cycle.
///
/// The three classes toggle independently: enabling corners does not
/// imply edges, and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RefreshClass {
    /// Exchange across faces (weight 1).
    pub face: bool,
    /// Exchange across edges (weight 2).
    pub edge: bool,
    /// Exchange across corners (weight 3).
    pub corner: bool,
}

impl RefreshClass {
    /// No exchange at all.
    pub const NONE: Self = Self {
        face: false,
        edge: false,
        corner: false,
    };
    /// Face neighbors only.
    pub const FACE_ONLY: Self = Self {
        face: true,
        edge: false,
        corner: false,
    };
    /// Face and edge neighbors.
    pub const FACE_EDGE: Self = Self {
        face: true,
        edge: true,
        corner: false,
    };
    /// Face, edge, and corner neighbors.
    pub const ALL: Self = Self {
        face: true,
        edge: true,
        corner: true,
    };

    /// Whether directions of `class` are exchanged.
    pub fn enables(&self, class: NeighborClass) -> bool {
        match class {
            NeighborClass::Face => self.face,
            NeighborClass::Edge => self.edge,
            NeighborClass::Corner => self.corner,
        }
    }
}

impl Default for RefreshClass {
    fn default() -> Self {
        Self::FACE_ONLY
    }
}
