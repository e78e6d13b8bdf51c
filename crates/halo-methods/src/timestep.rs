//! Timestep policies.

use halo_method::{BlockView, Timestep};

/// The same timestep everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedTimestep(pub f64);

impl Timestep for FixedTimestep {
    fn evaluate(&self, _block: &BlockView<'_>) -> f64 {
        self.0
    }
}

/// Courant-limited timestep: `courant * min(h) / speed`.
///
/// `min(h)` ranges over axes with more than one cell; a block with no such
/// axis uses the smallest cell width overall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CflTimestep {
    /// Courant number, typically in `(0, 1]`.
    pub courant: f64,
    /// Fastest signal speed in the domain.
    pub speed: f64,
}

impl CflTimestep {
    /// Policy with the given Courant number and signal speed.
    pub fn new(courant: f64, speed: f64) -> Self {
        Self { courant, speed }
    }
}

impl Timestep for CflTimestep {
    fn evaluate(&self, block: &BlockView<'_>) -> f64 {
        let h = block.cell_width();
        let ghosts = block.field_block().ghosts();
        let active = h
            .iter()
            .zip(ghosts)
            .filter(|(_, g)| *g > 0)
            .map(|(h, _)| *h)
            .fold(f64::INFINITY, f64::min);
        let h_min = if active.is_finite() {
            active
        } else {
            h.iter().copied().fold(f64::INFINITY, f64::min)
        };
        if self.speed <= 0.0 {
            return f64::INFINITY;
        }
        self.courant * h_min / self.speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::{BlockExtents, BlockIndex, CellCounts, CycleId};
    use halo_field::{BlockGeometry, FieldBlock};

    fn evaluate(policy: &dyn Timestep, cells: CellCounts) -> f64 {
        let geometry = BlockGeometry::unit(BlockExtents::new(2, 1, 1).unwrap(), cells);
        let field = FieldBlock::new(cells, 1, 1).unwrap();
        let view = BlockView::new(
            BlockIndex { ix: 0, iy: 0, iz: 0 },
            CycleId(0),
            0.0,
            0.0,
            &field,
            &geometry,
        );
        policy.evaluate(&view)
    }

    #[test]
    fn fixed_ignores_block() {
        assert_eq!(evaluate(&FixedTimestep(0.3), CellCounts::cube(4).unwrap()), 0.3);
    }

    #[test]
    fn cfl_uses_smallest_active_width() {
        // Block width [0.5, 1, 1]; cells [5, 4, 1] -> h = [0.1, 0.25, 1].
        let dt = evaluate(&CflTimestep::new(0.5, 2.0), CellCounts::new(5, 4, 1).unwrap());
        assert!((dt - 0.025).abs() < 1e-12);
    }

    #[test]
    fn cfl_single_cell_block_falls_back_to_min_width() {
        // h = [0.5, 1, 1], no exchanging axis.
        let dt = evaluate(&CflTimestep::new(1.0, 1.0), CellCounts::cube(1).unwrap());
        assert!((dt - 0.5).abs() < 1e-12);
    }

    #[test]
    fn cfl_zero_speed_is_unbounded() {
        assert_eq!(
            evaluate(&CflTimestep::new(1.0, 0.0), CellCounts::cube(2).unwrap()),
            f64::INFINITY
        );
    }
}
