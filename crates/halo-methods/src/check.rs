//! Non-fatal sanity check on field values.

use halo_core::MethodError;
use halo_method::{ComputeContext, Method};
use log::warn;

/// Scans a field's interior for negative values.
///
/// Negative values are reported through `log::warn!` and the block keeps
/// running: a transient numerical artefact is not a protocol failure.
#[derive(Clone, Debug)]
pub struct NonNegativeCheck {
    field: usize,
}

impl NonNegativeCheck {
    /// Check `field`.
    pub fn new(field: usize) -> Self {
        Self { field }
    }

    /// Number of negative interior values in `ctx`.
    pub fn count(&self, ctx: &ComputeContext<'_>) -> Result<usize, MethodError> {
        let values = ctx.field().interior_values(self.field)?;
        Ok(values.iter().filter(|&&v| v < 0.0).count())
    }
}

impl Method for NonNegativeCheck {
    fn name(&self) -> &str {
        "non_negative_check"
    }

    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
        let negative = self.count(ctx)?;
        if negative > 0 {
            warn!(
                "block {} cycle {}: {} negative value(s) in field {}",
                ctx.index(),
                ctx.cycle(),
                negative,
                self.field
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_core::{BlockExtents, BlockIndex, CellCounts, CycleId};
    use halo_field::{BlockGeometry, FieldBlock};

    #[test]
    fn negative_values_are_reported_not_fatal() {
        let cells = CellCounts::cube(2).unwrap();
        let geometry = BlockGeometry::unit(BlockExtents::new(1, 1, 1).unwrap(), cells);
        let mut field = FieldBlock::new(cells, 1, 1).unwrap();
        field.set(0, 0, 1, 1, -0.5);
        field.set(0, 1, 1, 1, -2.0);
        // Ghost cells are not inspected.
        field.set(0, -1, 0, 0, -7.0);
        let mut ctx = ComputeContext::new(
            BlockIndex { ix: 0, iy: 0, iz: 0 },
            CycleId(1),
            0.0,
            0.1,
            &mut field,
            &geometry,
        );
        let check = NonNegativeCheck::new(0);
        assert_eq!(check.count(&ctx).unwrap(), 2);
        assert!(check.compute_block(&mut ctx).is_ok());
        assert_eq!(ctx.field().get(0, 1, 1, 1), -2.0);
    }

    #[test]
    fn missing_field_is_an_error() {
        let cells = CellCounts::cube(2).unwrap();
        let geometry = BlockGeometry::unit(BlockExtents::new(1, 1, 1).unwrap(), cells);
        let mut field = FieldBlock::new(cells, 1, 1).unwrap();
        let mut ctx = ComputeContext::new(
            BlockIndex { ix: 0, iy: 0, iz: 0 },
            CycleId(0),
            0.0,
            0.1,
            &mut field,
            &geometry,
        );
        assert!(NonNegativeCheck::new(3).compute_block(&mut ctx).is_err());
    }
}
