//! Explicit Jacobi diffusion on one field.

use halo_core::{Axis, FieldError, MethodError};
use halo_method::{ComputeContext, Method};

/// Forward-Euler diffusion with a 7-point stencil.
///
/// Each cycle computes
/// ```text
/// u_new = u + D * dt * sum_axes (u[+1] - 2u + u[-1]) / h^2
/// ```
/// reading every neighbor value from the start-of-cycle snapshot. Axes with
/// a single cell carry no ghost layer and are skipped. The stencil reads
/// one ghost cell on each side, so it needs a ghost depth of at least one.
#[derive(Clone, Debug)]
pub struct JacobiDiffusion {
    field: usize,
    diffusivity: f64,
}

impl JacobiDiffusion {
    /// Diffuse `field` with coefficient `diffusivity`.
    pub fn new(field: usize, diffusivity: f64) -> Self {
        Self { field, diffusivity }
    }

    /// Largest stable explicit timestep for cell widths `h`: `1 / (2D sum 1/h^2)`.
    ///
    /// Returns `f64::INFINITY` when the diffusivity is zero.
    pub fn stable_dt(&self, h: [f64; 3]) -> f64 {
        let inv: f64 = h.iter().map(|h| 1.0 / (h * h)).sum();
        if self.diffusivity <= 0.0 {
            return f64::INFINITY;
        }
        1.0 / (2.0 * self.diffusivity * inv)
    }
}

impl Method for JacobiDiffusion {
    fn name(&self) -> &str {
        "jacobi_diffusion"
    }

    fn compute_block(&self, ctx: &mut ComputeContext<'_>) -> Result<(), MethodError> {
        let block = ctx.field();
        if self.field >= block.field_count() {
            return Err(FieldError::FieldOutOfRange {
                field: self.field,
                field_count: block.field_count(),
            }
            .into());
        }
        let ghosts = block.ghosts();
        if ghosts.iter().zip(block.cells().to_array()).any(|(&g, n)| n > 1 && g == 0) {
            return Err(MethodError::ExecutionFailed {
                reason: "diffusion stencil needs ghost depth of at least 1".into(),
            });
        }

        let h = ctx.geometry().cell_width();
        let scale = self.diffusivity * ctx.dt();
        let prev = block.clone();
        let active: Vec<Axis> = Axis::ALL
            .into_iter()
            .filter(|a| ghosts[a.index()] > 0)
            .collect();

        let out = ctx.field_mut();
        for (i, j, k) in prev.interior() {
            let u = prev.get(self.field, i, j, k);
            let mut lap = 0.0;
            for &axis in &active {
                let step = |s: isize| match axis {
                    Axis::X => (i + s, j, k),
                    Axis::Y => (i, j + s, k),
                    Axis::Z => (i, j, k + s),
                };
                let (a, b, c) = step(1);
                let (d, e, f) = step(-1);
                let hh = h[axis.index()] * h[axis.index()];
                lap += (prev.get(self.field, a, b, c) - 2.0 * u + prev.get(self.field, d, e, f)) / hh;
            }
            out.set(self.field, i, j, k, u + scale * lap);
        }
        Ok(())
    }
}
