//! Benchmark profiles for the halo block-exchange framework.
//!
//! Provides pre-built domain profiles for benchmarking:
//!
//! - [`reference_config`]: 4x4x1 blocks of 32x32 cells, periodic in x and y
//! - [`stress_config`]: 4x4x4 blocks of 16³ cells, all 26 directions
//! - [`diffusion_collaborators`]: Jacobi diffusion at 90% of the stable step
//! - [`pulse_init`]: Gaussian pulse centred in the domain

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::sync::Arc;

use halo_core::{BlockExtents, BlockIndex, CellCounts, Periodicity, RefreshClass};
use halo_engine::{ConfigError, Domain, DomainConfig};
use halo_field::FieldBlock;
use halo_method::{Collaborators, MethodList, RegistryError};
use halo_methods::{FixedTimestep, JacobiDiffusion, ReflectingBoundary, StopAt};

/// Diffusivity used by every profile.
pub const DIFFUSIVITY: f64 = 0.1;

/// 16 blocks of 32x32 cells (16K cells), faces only.
pub fn reference_config() -> Result<DomainConfig, ConfigError> {
    Ok(DomainConfig {
        periodicity: Periodicity([true, true, false]),
        ..DomainConfig::new(BlockExtents::new(4, 4, 1)?, CellCounts::new(32, 32, 1)?)
    })
}

/// 64 blocks of 16³ cells (~262K cells), every neighbor class.
pub fn stress_config() -> Result<DomainConfig, ConfigError> {
    Ok(DomainConfig {
        periodicity: Periodicity::all(),
        refresh: RefreshClass::ALL,
        ..DomainConfig::new(BlockExtents::new(4, 4, 4)?, CellCounts::cube(16)?)
    })
}

/// Diffusion on field 0 with reflecting walls, stopping after `cycles`
/// cycles have been computed.
pub fn diffusion_collaborators(
    config: &DomainConfig,
    cycles: u64,
) -> Result<Collaborators, RegistryError> {
    let diffusion = JacobiDiffusion::new(0, DIFFUSIVITY);
    let dt = 0.9 * diffusion.stable_dt(config.geometry().cell_width());
    let methods = MethodList::new().with(Box::new(diffusion))?;
    Ok(Collaborators::new(
        Arc::new(ReflectingBoundary),
        Arc::new(FixedTimestep(dt)),
        Arc::new(StopAt::cycle(cycles.saturating_sub(1))),
    )
    .with_methods(methods))
}

/// Initializer placing a unit Gaussian pulse at the domain centre.
pub fn pulse_init(config: &DomainConfig) -> impl Fn(BlockIndex, &mut FieldBlock) {
    let geometry = config.geometry();
    let lower = geometry.domain_lower();
    let upper = geometry.domain_upper();
    let centre: [f64; 3] = std::array::from_fn(|a| 0.5 * (lower[a] + upper[a]));
    let width = (0..3).map(|a| upper[a] - lower[a]).fold(f64::MAX, f64::min) / 8.0;
    move |index, block| {
        block.fill_interior_with(0, |i, j, k| {
            let p = geometry.cell_center(index, i, j, k);
            let r2: f64 = (0..3).map(|a| (p[a] - centre[a]).powi(2)).sum();
            (-r2 / (width * width)).exp()
        });
    }
}

/// A ready-to-run diffusion domain for `config`.
pub fn build_domain(config: DomainConfig, cycles: u64) -> Result<Domain, Box<dyn Error>> {
    let collab = diffusion_collaborators(&config, cycles)?;
    let init = pulse_init(&config);
    Ok(Domain::new(config, collab, init)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        reference_config().unwrap().validate().unwrap();
        stress_config().unwrap().validate().unwrap();
    }

    #[test]
    fn reference_profile_runs_requested_cycles() {
        let domain = build_domain(reference_config().unwrap(), 3).unwrap();
        let report = domain.run_lockstep().unwrap();
        assert_eq!(report.cycles(), 3);
    }

    #[test]
    fn pulse_peaks_near_the_centre() {
        let config = reference_config().unwrap();
        let init = pulse_init(&config);
        let mut centre_block = FieldBlock::new(config.cells, 1, 1).unwrap();
        let mut corner_block = FieldBlock::new(config.cells, 1, 1).unwrap();
        init(config.extents.index(2, 2, 0).unwrap(), &mut centre_block);
        init(config.extents.index(0, 0, 0).unwrap(), &mut corner_block);
        assert!(centre_block.get(0, 0, 0, 0) > 0.9);
        assert!(corner_block.get(0, 0, 0, 0) < 1e-6);
    }
}
