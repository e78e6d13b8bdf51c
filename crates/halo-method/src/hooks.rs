//! The collaborator traits.
//!
//! All collaborators take `&self` and are `Send + Sync`: one instance is
//! shared by every block actor, possibly across threads. Mutable state
//! lives in the field data, never in a collaborator.

use std::sync::Arc;

use halo_core::{Axis, CycleId, Face, MethodError};
use halo_field::FieldBlock;

use crate::context::{BlockView, ComputeContext};

/// Fills ghost cells on faces that lie on a non-periodic domain boundary.
///
/// Called once per enforced face during the prepare phase, before the
/// timestep is evaluated.
pub trait Boundary: Send + Sync + 'static {
    /// Fill the ghost layer of `block` on `face` of `axis`.
    fn enforce(&self, block: &mut FieldBlock, axis: Axis, face: Face);
}

/// Computes a block's local timestep candidate.
pub trait Timestep: Send + Sync + 'static {
    /// Largest stable timestep for this block.
    ///
    /// The candidates of all blocks are reduced with `min`.
    fn evaluate(&self, block: &BlockView<'_>) -> f64;
}

/// Decides when the simulation ends.
pub trait Stopping: Send + Sync + 'static {
    /// Whether this block considers the run complete at `cycle`, `time`.
    ///
    /// The decisions of all blocks are reduced with logical OR.
    fn complete(&self, cycle: CycleId, time: f64) -> bool;

    /// Final simulation time. The timestep is clamped so that time never
    /// passes it.
    fn stop_time(&self) -> f64;
}

/// An output schedule that may shorten the timestep to land exactly on a
/// scheduled output time.
pub trait OutputSchedule: Send + Sync + 'static {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Return `dt`, possibly reduced, for a step starting at `time`.
    fn update_timestep(&self, time: f64, dt: f64) -> f64;
}

/// A numerical method run on every block once per cycle, after ghost
/// data has arrived.
///
/// # Examples
///
/// ```
/// use halo_core::MethodError;
/// use halo_method::{ComputeContext, Method};
///
/// struct Decay {
///     rate: f64,
/// }
///
/// impl Method for Decay {
///     fn name(&self) -> &str {
///         "decay"
///     }
///
///     fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
///         let factor = 1.0 - self.rate * ctx.dt();
///         let cells: Vec<_> = ctx.field().interior().collect();
///         let field = ctx.field_mut();
///         for (i, j, k) in cells {
///             let v = field.get(0, i, j, k);
///             field.set(0, i, j, k, v * factor);
///         }
///         Ok(())
///     }
/// }
///
/// assert_eq!(Decay { rate: 0.5 }.name(), "decay");
/// ```
pub trait Method: Send + Sync + 'static {
    /// Unique name within a [`MethodList`](crate::MethodList).
    fn name(&self) -> &str;

    /// Advance the block's interior by `ctx.dt()`.
    ///
    /// An error is fatal for the block.
    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError>;
}

/// A shared method, so the caller can keep a handle after registering it.
impl<M: Method + ?Sized> Method for Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
        (**self).compute_block(ctx)
    }
}
