//! The shared collaborator bundle and the timestep pipeline.

use std::fmt;
use std::sync::Arc;

use crate::context::BlockView;
use crate::hooks::{Boundary, OutputSchedule, Stopping, Timestep};
use crate::registry::MethodList;

/// Every collaborator a block actor consults, shared read-only across
/// actors.
///
/// Cloning is cheap: all members are reference counted.
#[derive(Clone)]
pub struct Collaborators {
    /// Domain boundary conditions.
    pub boundary: Arc<dyn Boundary>,
    /// Local timestep policy.
    pub timestep: Arc<dyn Timestep>,
    /// Termination criteria.
    pub stopping: Arc<dyn Stopping>,
    /// Output schedules, consulted in order.
    pub outputs: Vec<Arc<dyn OutputSchedule>>,
    /// Compute hooks, run in order.
    pub methods: Arc<MethodList>,
}

impl Collaborators {
    /// Bundle with no outputs and no methods.
    pub fn new(
        boundary: Arc<dyn Boundary>,
        timestep: Arc<dyn Timestep>,
        stopping: Arc<dyn Stopping>,
    ) -> Self {
        Self {
            boundary,
            timestep,
            stopping,
            outputs: Vec::new(),
            methods: Arc::new(MethodList::new()),
        }
    }

    /// Append an output schedule.
    pub fn with_output(mut self, output: Arc<dyn OutputSchedule>) -> Self {
        self.outputs.push(output);
        self
    }

    /// Replace the method list.
    pub fn with_methods(mut self, methods: MethodList) -> Self {
        self.methods = Arc::new(methods);
        self
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators")
            .field(
                "outputs",
                &self.outputs.iter().map(|o| o.name()).collect::<Vec<_>>(),
            )
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

/// A block's timestep candidate for the cycle starting at `view.time()`.
///
/// The timestep policy's value is passed through every output schedule in
/// order, then clamped so the step does not pass the stopping time. A NaN
/// from the policy or a schedule is returned unclamped.
pub fn candidate_timestep(collab: &Collaborators, view: &BlockView<'_>) -> f64 {
    let time = view.time();
    let mut dt = collab.timestep.evaluate(view);
    for output in &collab.outputs {
        if dt.is_nan() {
            return dt;
        }
        dt = output.update_timestep(time, dt);
    }
    let limit = collab.stopping.stop_time() - time;
    if dt > limit {
        limit
    } else {
        dt
    }
}
