//! Integration test: driver equivalence, stopping and failure handling.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use halo_core::{BlockExtents, CellCounts, CommError, CycleId};
use halo_engine::{Domain, DomainConfig, RunError, RunReport};
use halo_method::{Collaborators, MethodList};
use halo_methods::{FixedTimestep, IntervalOutput, JacobiDiffusion, NonNegativeCheck, ReflectingBoundary, StopAt};
use halo_test_utils::fixtures::collaborators;
use halo_test_utils::{FailingMethod, NoopBoundary, PerBlockTimestep, StopAfterCycles};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ── Diffusion: threaded and lockstep agree ───────────────────────────

const N: usize = 6;

fn diffusion_domain() -> Domain {
    let cfg = DomainConfig::new(
        BlockExtents::new(2, 2, 1).unwrap(),
        CellCounts::new(N, N, 1).unwrap(),
    );
    let diffusion = JacobiDiffusion::new(0, 1.0);
    let h = 1.0 / (2 * N) as f64;
    let dt = 0.9 * diffusion.stable_dt([h, h, 1.0]);
    let methods = MethodList::new()
        .with(Box::new(diffusion))
        .unwrap()
        .with(Box::new(NonNegativeCheck::new(0)))
        .unwrap();
    let collab = Collaborators::new(
        Arc::new(ReflectingBoundary),
        Arc::new(FixedTimestep(dt)),
        Arc::new(StopAt::cycle(19)),
    )
    .with_methods(methods);
    Domain::new(cfg, collab, |index, block| {
        block.fill_interior_with(0, |i, j, _| {
            let x = f64::from(index.ix) * N as f64 + i as f64 + 0.5;
            let y = f64::from(index.iy) * N as f64 + j as f64 + 0.5;
            let r2 = (x - 3.0).powi(2) + (y - 7.0).powi(2);
            (-r2 / 4.0).exp()
        });
    })
    .unwrap()
}

fn total(report: &RunReport) -> f64 {
    report
        .blocks
        .iter()
        .map(|b| b.field.interior_values(0).unwrap().iter().sum::<f64>())
        .sum()
}

#[test]
fn threaded_and_lockstep_produce_identical_fields() {
    init_logging();
    let before = {
        let domain = diffusion_domain();
        domain
            .actors()
            .iter()
            .map(|a| a.field().interior_values(0).unwrap().iter().sum::<f64>())
            .sum::<f64>()
    };

    let threaded = diffusion_domain().run_threaded().unwrap();
    let lockstep = diffusion_domain().run_lockstep().unwrap();

    assert_eq!(threaded.cycles(), 20);
    assert_eq!(threaded.history, lockstep.history);
    for (a, b) in threaded.blocks.iter().zip(&lockstep.blocks) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.cycle, b.cycle);
        assert_eq!(a.time, b.time);
        let va = a.field.interior_values(0).unwrap();
        let vb = b.field.interior_values(0).unwrap();
        assert!(
            va.iter().zip(&vb).all(|(x, y)| x.to_bits() == y.to_bits()),
            "block {} differs between drivers",
            a.index
        );
    }

    // Reflecting walls: nothing leaves the domain.
    let after = total(&lockstep);
    assert!((after - before).abs() <= 1e-9 * before, "{before} -> {after}");
}

#[test]
fn diffusion_spreads_the_peak() {
    let peak = |report: &RunReport| {
        report
            .blocks
            .iter()
            .flat_map(|b| b.field.interior_values(0).unwrap())
            .fold(f64::MIN, f64::max)
    };
    let initial_peak = diffusion_domain()
        .actors()
        .iter()
        .flat_map(|a| a.field().interior_values(0).unwrap())
        .fold(f64::MIN, f64::max);
    let report = diffusion_domain().run_lockstep().unwrap();
    assert!(peak(&report) < initial_peak);
    assert!(peak(&report) > 0.0);
}

// ── Stopping and timestep clamping ───────────────────────────────────

#[test]
fn outputs_and_stop_time_clamp_the_step() {
    init_logging();
    let cfg = DomainConfig::new(BlockExtents::new(2, 1, 1).unwrap(), CellCounts::cube(2).unwrap());
    let collab = Collaborators::new(
        Arc::new(NoopBoundary),
        Arc::new(FixedTimestep(0.3)),
        Arc::new(StopAt::time(1.0)),
    )
    .with_output(Arc::new(IntervalOutput::new("dump", 0.25)));
    let report = Domain::new(cfg, collab, |_, _| {})
        .unwrap()
        .run_lockstep()
        .unwrap();

    let dts: Vec<f64> = report.history.iter().map(|r| r.result.global_dt).collect();
    assert_eq!(dts, vec![0.25, 0.25, 0.25, 0.25, 0.0]);
    assert!(report.history.last().unwrap().result.global_stop);
    for block in &report.blocks {
        assert_eq!(block.time, 1.0);
        assert_eq!(block.cycle, CycleId(5));
    }
}

#[test]
fn stop_time_shortens_the_last_step() {
    let cfg = DomainConfig::new(BlockExtents::single(), CellCounts::cube(2).unwrap());
    let collab = Collaborators::new(
        Arc::new(NoopBoundary),
        Arc::new(FixedTimestep(0.4)),
        Arc::new(StopAt::time(1.0)),
    );
    let report = Domain::new(cfg, collab, |_, _| {})
        .unwrap()
        .run_threaded()
        .unwrap();
    let block = &report.blocks[0];
    assert!(block.time <= 1.0 + 1e-12, "overshot to {}", block.time);
    assert!((block.time - 1.0).abs() < 1e-12);
}

#[test]
fn max_cycles_caps_the_run() {
    let cfg = DomainConfig {
        max_cycles: Some(3),
        ..DomainConfig::new(BlockExtents::new(2, 2, 1).unwrap(), CellCounts::cube(2).unwrap())
    };
    let report = Domain::new(cfg, collaborators(0.1, 1000, MethodList::new()), |_, _| {})
        .unwrap()
        .run_threaded()
        .unwrap();
    assert_eq!(report.cycles(), 3);
    assert!(report.blocks.iter().all(|b| b.cycle == CycleId(3)));
}

// ── Failures ─────────────────────────────────────────────────────────

fn failing_domain() -> Domain {
    let cfg = DomainConfig {
        periodicity: halo_core::Periodicity::all(),
        ..DomainConfig::new(BlockExtents::new(2, 2, 2).unwrap(), CellCounts::cube(3).unwrap())
    };
    let target = cfg.extents.index(1, 0, 1).unwrap();
    let methods = MethodList::new()
        .with(Box::new(FailingMethod {
            block: target,
            at_cycle: 2,
        }))
        .unwrap();
    Domain::new(cfg, collaborators(0.1, 10, methods), |_, _| {}).unwrap()
}

fn assert_method_failure(result: Result<RunReport, RunError>) {
    match result {
        Err(RunError::Comm(CommError::Method { name, .. })) => assert_eq!(name, "failing"),
        other => panic!("expected the scripted method failure, got {other:?}"),
    }
}

#[test]
fn method_failure_stops_lockstep_run() {
    init_logging();
    assert_method_failure(failing_domain().run_lockstep());
}

#[test]
fn method_failure_stops_threaded_run_without_hanging() {
    init_logging();
    assert_method_failure(failing_domain().run_threaded());
}

fn nan_vote_domain() -> Domain {
    let cfg = DomainConfig::new(BlockExtents::new(2, 1, 1).unwrap(), CellCounts::cube(2).unwrap());
    // Block 0 votes NaN in cycle 1; block 1 always votes a valid step.
    let timestep = PerBlockTimestep::new(|index, cycle| {
        if index.ix == 0 && cycle == CycleId(1) {
            f64::NAN
        } else {
            0.5
        }
    });
    let collab = Collaborators::new(
        Arc::new(NoopBoundary),
        Arc::new(timestep),
        Arc::new(StopAt::time(10.0)),
    );
    Domain::new(cfg, collab, |_, _| {}).unwrap()
}

fn assert_invalid_timestep(result: Result<RunReport, RunError>) {
    match result {
        Err(RunError::Comm(CommError::InvalidTimestep { block, cycle, dt })) => {
            assert_eq!(block, 0);
            assert_eq!(cycle, CycleId(1));
            assert!(dt.is_nan());
        }
        other => panic!("expected an invalid timestep, got {other:?}"),
    }
}

#[test]
fn nan_timestep_vote_stops_lockstep_run() {
    init_logging();
    assert_invalid_timestep(nan_vote_domain().run_lockstep());
}

#[test]
fn nan_timestep_vote_stops_threaded_run() {
    init_logging();
    assert_invalid_timestep(nan_vote_domain().run_threaded());
}

#[test]
fn liveness_timeout_reports_the_waiting_block() {
    init_logging();
    let cfg = DomainConfig {
        liveness_timeout: Some(Duration::from_millis(50)),
        ..DomainConfig::new(BlockExtents::new(2, 1, 1).unwrap(), CellCounts::cube(2).unwrap())
    };
    // Block 0 stalls in its timestep evaluation at cycle 1.
    let timestep = PerBlockTimestep::new(|index, cycle| {
        if index.ix == 0 && cycle == CycleId(1) {
            thread::sleep(Duration::from_millis(500));
        }
        0.1
    });
    let collab = Collaborators::new(
        Arc::new(NoopBoundary),
        Arc::new(timestep),
        Arc::new(StopAfterCycles(5)),
    );
    let result = Domain::new(cfg, collab, |_, _| {}).unwrap().run_threaded();
    match result {
        Err(RunError::Comm(CommError::LivenessTimeout { state, cycle, .. })) => {
            assert_eq!(state, "AwaitReduction");
            assert_eq!(cycle, CycleId(1));
        }
        other => panic!("expected a liveness timeout, got {other:?}"),
    }
}
