//! Per-block protocol counters.

use std::time::Duration;

/// Message and wait statistics for one block over a run.
///
/// Wait times are wall-clock microseconds spent suspended in
/// `AwaitReduction` and `AwaitGhosts`. The lockstep driver never blocks,
/// so its wait times measure scheduling order rather than contention.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockMetrics {
    /// Cycles completed.
    pub cycles: u64,
    /// Ghost messages sent, self-addressed null messages excluded.
    pub ghosts_sent: u64,
    /// Ghost messages received, null messages excluded.
    pub ghosts_received: u64,
    /// Payload bytes sent.
    pub bytes_sent: u64,
    /// Payload bytes received.
    pub bytes_received: u64,
    /// Ghost messages (null included) that arrived before the block
    /// reached `AwaitGhosts`.
    pub early_arrivals: u64,
    /// Time suspended waiting for reduction results, in microseconds.
    pub reduction_wait_us: u64,
    /// Time suspended waiting for ghost quorum, in microseconds.
    pub ghost_wait_us: u64,
}

impl BlockMetrics {
    /// Add `other`'s counters to `self`.
    pub fn merge(&mut self, other: &BlockMetrics) {
        self.cycles += other.cycles;
        self.ghosts_sent += other.ghosts_sent;
        self.ghosts_received += other.ghosts_received;
        self.bytes_sent += other.bytes_sent;
        self.bytes_received += other.bytes_received;
        self.early_arrivals += other.early_arrivals;
        self.reduction_wait_us += other.reduction_wait_us;
        self.ghost_wait_us += other.ghost_wait_us;
    }

    pub(crate) fn add_wait(slot: &mut u64, waited: Duration) {
        *slot = slot.saturating_add(u64::try_from(waited.as_micros()).unwrap_or(u64::MAX));
    }
}
