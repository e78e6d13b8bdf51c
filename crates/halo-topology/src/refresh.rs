//! Inbound-message quorum for one refresh cycle.

use halo_core::NeighborClass;

use crate::face_set::FaceSet;

/// Converts an active-direction set into the number of ghost messages a
/// block must receive before it may compute.
///
/// The count is never transmitted: every block derives it from the same
/// deterministic inputs, and a sender's active set always mirrors the
/// receiver's (see [`FaceSet::determine`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshCounter {
    faces: usize,
    edges: usize,
    corners: usize,
}

impl RefreshCounter {
    /// Count the active directions by class.
    pub fn new(active: &FaceSet) -> Self {
        Self {
            faces: active.count_class(NeighborClass::Face),
            edges: active.count_class(NeighborClass::Edge),
            corners: active.count_class(NeighborClass::Corner),
        }
    }

    /// Expected inbound messages per cycle: one per active direction plus
    /// the block's own null message.
    ///
    /// The self message guarantees progress for a block with no active
    /// directions.
    pub fn quorum(&self) -> usize {
        1 + self.faces + self.edges + self.corners
    }

    /// Active face directions.
    pub fn faces(&self) -> usize {
        self.faces
    }

    /// Active edge directions.
    pub fn edges(&self) -> usize {
        self.edges
    }

    /// Active corner directions.
    pub fn corners(&self) -> usize {
        self.corners
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::is_boundary;
    use halo_core::{BlockExtents, CellCounts, Periodicity, RefreshClass};

    fn quorum_for(refresh: RefreshClass) -> usize {
        let e = BlockExtents::new(3, 3, 3).unwrap();
        let cells = CellCounts::cube(8).unwrap();
        let mut quorums = Vec::new();
        for idx in e.iter() {
            let set = FaceSet::determine(cells, Periodicity::all(), is_boundary(idx, e), refresh);
            quorums.push(RefreshCounter::new(&set).quorum());
        }
        assert!(quorums.windows(2).all(|w| w[0] == w[1]));
        quorums[0]
    }

    #[test]
    fn periodic_quorum_face_only() {
        assert_eq!(quorum_for(RefreshClass::FACE_ONLY), 1 + 6);
    }

    #[test]
    fn periodic_quorum_face_edge() {
        assert_eq!(quorum_for(RefreshClass::FACE_EDGE), 1 + 6 + 12);
    }

    #[test]
    fn periodic_quorum_all() {
        assert_eq!(quorum_for(RefreshClass::ALL), 1 + 6 + 12 + 8);
    }

    #[test]
    fn empty_set_still_needs_self() {
        let counter = RefreshCounter::new(&FaceSet::empty());
        assert_eq!(counter.quorum(), 1);
    }

    #[test]
    fn open_corner_quorum_by_class() {
        let e = BlockExtents::new(3, 3, 3).unwrap();
        let cells = CellCounts::cube(4).unwrap();
        let set = FaceSet::determine(
            cells,
            Periodicity::none(),
            is_boundary(e.index(2, 2, 2).unwrap(), e),
            RefreshClass::ALL,
        );
        let counter = RefreshCounter::new(&set);
        assert_eq!(counter.faces(), 3);
        assert_eq!(counter.edges(), 3);
        assert_eq!(counter.corners(), 1);
        assert_eq!(counter.quorum(), 8);
    }
}
