//! Stopping criteria.

use halo_core::CycleId;
use halo_method::Stopping;

/// Stop once a cycle count or a simulation time is reached, whichever
/// comes first.
///
/// # Examples
///
/// ```
/// use halo_core::CycleId;
/// use halo_method::Stopping;
/// use halo_methods::StopAt;
///
/// let stop = StopAt::time(1.0).with_cycle(10);
/// assert!(!stop.complete(CycleId(3), 0.5));
/// assert!(stop.complete(CycleId(10), 0.5));
/// assert!(stop.complete(CycleId(3), 1.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StopAt {
    cycle: Option<u64>,
    time: f64,
}

impl StopAt {
    /// Stop at simulation time `time`.
    pub fn time(time: f64) -> Self {
        Self { cycle: None, time }
    }

    /// Stop at cycle `cycle`, with no time limit.
    pub fn cycle(cycle: u64) -> Self {
        Self {
            cycle: Some(cycle),
            time: f64::INFINITY,
        }
    }

    /// Also stop at cycle `cycle`.
    pub fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = Some(cycle);
        self
    }
}

impl Stopping for StopAt {
    fn complete(&self, cycle: CycleId, time: f64) -> bool {
        self.cycle.is_some_and(|stop| cycle.0 >= stop) || time >= self.time
    }

    fn stop_time(&self) -> f64 {
        self.time
    }
}
