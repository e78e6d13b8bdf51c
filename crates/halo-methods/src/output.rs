//! Output schedules.

use halo_method::OutputSchedule;

/// Output every `interval` units of simulation time.
///
/// The timestep is shortened so that a step never jumps over the next
/// output time. Times within a relative tolerance of an output time count
/// as being on it, so accumulated rounding does not produce a tiny extra
/// step.
#[derive(Clone, Debug, PartialEq)]
pub struct IntervalOutput {
    name: String,
    interval: f64,
}

impl IntervalOutput {
    const TOLERANCE: f64 = 1e-9;

    /// Schedule `name` every `interval`.
    pub fn new(name: impl Into<String>, interval: f64) -> Self {
        Self {
            name: name.into(),
            interval,
        }
    }

    /// First output time strictly after `time`.
    pub fn next_output(&self, time: f64) -> f64 {
        let mut next = ((time / self.interval).floor() + 1.0) * self.interval;
        if next - time <= Self::TOLERANCE * self.interval {
            next += self.interval;
        }
        next
    }
}

impl OutputSchedule for IntervalOutput {
    fn name(&self) -> &str {
        &self.name
    }

    fn update_timestep(&self, time: f64, dt: f64) -> f64 {
        if !(self.interval > 0.0 && self.interval.is_finite()) {
            return dt;
        }
        dt.min(self.next_output(time) - time)
    }
}
