//! Index ranges of the interior layer and ghost layer along a direction.

use std::ops::Range;

use halo_core::{Axis, Direction};

/// Which side of the block edge a region covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionRole {
    /// The last `g` interior cells toward the direction (what a sender packs).
    Interior,
    /// The `g` ghost cells beyond the interior toward the direction
    /// (what a receiver fills).
    Ghost,
}

/// A box of cells, one half-open range per axis in interior-relative
/// coordinates (ghost cells are negative or `>= n`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceRegion {
    ranges: [Range<isize>; 3],
}

impl FaceRegion {
    /// Region for `direction` and `role`, given interior cells `n` and
    /// ghost depth `g` per axis.
    ///
    /// A zero component spans the full interior along that axis. Along a
    /// non-zero component the region is `g` cells thick.
    pub fn new(direction: Direction, role: RegionRole, n: [usize; 3], g: [usize; 3]) -> Self {
        let range = |axis: Axis| -> Range<isize> {
            let i = axis.index();
            let n = n[i] as isize;
            let g = g[i] as isize;
            match (direction.component(axis), role) {
                (0, _) => 0..n,
                (c, RegionRole::Interior) if c < 0 => 0..g,
                (_, RegionRole::Interior) => n - g..n,
                (c, RegionRole::Ghost) if c < 0 => -g..0,
                (_, RegionRole::Ghost) => n..n + g,
            }
        };
        Self {
            ranges: [range(Axis::X), range(Axis::Y), range(Axis::Z)],
        }
    }

    /// Range along `axis`.
    pub fn range(&self, axis: Axis) -> Range<isize> {
        self.ranges[axis.index()].clone()
    }

    /// Number of cells in the region.
    pub fn cell_count(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).product()
    }

    /// Every `(i, j, k)` in the region, x fastest.
    pub fn iter(&self) -> impl Iterator<Item = (isize, isize, isize)> + '_ {
        let [rx, ry, rz] = &self.ranges;
        rz.clone().flat_map(move |k| {
            ry.clone()
                .flat_map(move |j| rx.clone().map(move |i| (i, j, k)))
        })
    }
}
