//! Per-cycle reduction records.
//!
//! Every block contributes one [`ReductionContribution`] per cycle; the
//! reduction coordinator folds them into a single [`ReductionResult`]
//! (minimum timestep, logical-OR stop flag) that every block receives.

/// One block's input to the per-cycle reduction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReductionContribution {
    /// Largest timestep this block can take this cycle.
    pub candidate_dt: f64,
    /// Whether this block's stopping criteria are met.
    pub stop: bool,
}

impl ReductionContribution {
    /// Whether `candidate_dt` is a finite, non-negative step.
    pub fn is_valid(&self) -> bool {
        self.candidate_dt.is_finite() && self.candidate_dt >= 0.0
    }
}

/// The merged reduction, identical for every block in a given cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReductionResult {
    /// Minimum of every block's `candidate_dt`.
    pub global_dt: f64,
    /// Logical OR of every block's `stop`.
    pub global_stop: bool,
}

impl ReductionResult {
    /// Neutral element: `+inf` timestep, no stop.
    pub fn identity() -> Self {
        Self {
            global_dt: f64::INFINITY,
            global_stop: false,
        }
    }

    /// Fold one contribution in.
    ///
    /// Commutative and associative, so arrival order never matters.
    /// `min` drops a NaN candidate, so callers reject contributions that
    /// fail [`ReductionContribution::is_valid`] before merging.
    #[must_use]
    pub fn merge(self, c: ReductionContribution) -> Self {
        Self {
            global_dt: self.global_dt.min(c.candidate_dt),
            global_stop: self.global_stop || c.stop,
        }
    }
}

impl Default for ReductionResult {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c(candidate_dt: f64, stop: bool) -> ReductionContribution {
        ReductionContribution { candidate_dt, stop }
    }

    #[test]
    fn identity_is_neutral() {
        let r = ReductionResult::identity().merge(c(0.25, false));
        assert_eq!(r.global_dt, 0.25);
        assert!(!r.global_stop);
    }

    #[test]
    fn any_stop_wins() {
        let r = ReductionResult::identity()
            .merge(c(1.0, false))
            .merge(c(2.0, true))
            .merge(c(3.0, false));
        assert!(r.global_stop);
        assert_eq!(r.global_dt, 1.0);
    }

    #[test]
    fn non_finite_or_negative_candidates_are_invalid() {
        assert!(c(0.0, false).is_valid());
        assert!(c(0.5, true).is_valid());
        assert!(!c(f64::NAN, false).is_valid());
        assert!(!c(f64::INFINITY, false).is_valid());
        assert!(!c(-1e-3, false).is_valid());
    }

    proptest! {
        #[test]
        fn merge_is_order_independent(
            dts in proptest::collection::vec(1e-6f64..10.0, 1..20),
            stops in proptest::collection::vec(any::<bool>(), 1..20),
        ) {
            let items: Vec<_> = dts.iter().zip(stops.iter().cycle()).map(|(&d, &s)| c(d, s)).collect();
            let fwd = items.iter().fold(ReductionResult::identity(), |acc, &x| acc.merge(x));
            let rev = items.iter().rev().fold(ReductionResult::identity(), |acc, &x| acc.merge(x));
            prop_assert_eq!(fwd, rev);
            for item in &items {
                prop_assert!(fwd.global_dt <= item.candidate_dt);
            }
            prop_assert_eq!(fwd.global_stop, items.iter().any(|x| x.stop));
        }
    }
}
