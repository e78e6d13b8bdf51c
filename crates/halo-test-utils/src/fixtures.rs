//! Reusable domain fixtures.
//!
//! - [`marker_init`] fills each block with a value unique to that block,
//!   so a ghost cell reveals which neighbor it came from.
//! - [`check_ghost_markers`] verifies every active ghost region holds the
//!   marker of the neighbor it was addressed from.
//! - [`collaborators`] builds a minimal fixed-step bundle.

use std::sync::Arc;

use halo_core::{BlockExtents, BlockIndex, Direction};
use halo_field::{FieldBlock, RegionRole};
use halo_method::{Collaborators, MethodList};

use crate::{FixedDt, NoopBoundary, StopAfterCycles};

/// Marker for `field` of the block at `index`.
pub fn marker(extents: BlockExtents, index: BlockIndex, field: usize) -> f64 {
    (extents.linear(index) + 1) as f64 + 1000.0 * field as f64
}

/// Initializer that fills every field's interior with its block marker.
pub fn marker_init(extents: BlockExtents) -> impl Fn(BlockIndex, &mut FieldBlock) + Send + Sync + Clone {
    move |index, block| {
        for field in 0..block.field_count() {
            block.fill_interior(field, marker(extents, index, field));
        }
    }
}

/// Check that, for each `(direction, neighbor)` in `targets`, the ghost
/// region of `block` toward `direction` holds `neighbor`'s marker.
pub fn check_ghost_markers(
    block: &FieldBlock,
    extents: BlockExtents,
    targets: &[(Direction, BlockIndex)],
) -> Result<(), String> {
    for &(direction, neighbor) in targets {
        let region = block.region(direction, RegionRole::Ghost);
        for field in 0..block.field_count() {
            let want = marker(extents, neighbor, field);
            for (i, j, k) in region.iter() {
                let got = block.get(field, i, j, k);
                if got != want {
                    return Err(format!(
                        "ghost ({i}, {j}, {k}) toward {direction} field {field}: \
                         expected {want} from {neighbor}, found {got}"
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Fixed `dt`, stop once `cycles` cycles have been reached, no-op
/// boundaries, and `methods`.
pub fn collaborators(dt: f64, cycles: u64, methods: MethodList) -> Collaborators {
    Collaborators::new(
        Arc::new(NoopBoundary),
        Arc::new(FixedDt(dt)),
        Arc::new(StopAfterCycles(cycles)),
    )
    .with_methods(methods)
}
