//! Poll cadence and give-up limits.

use std::time::Duration;

/// How often and for how long a reservation trace is polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before the first poll.
    pub initial_interval: Duration,
    /// Factor applied to the wait after every poll.
    pub backoff_factor: u32,
    /// Upper bound for a single wait.
    pub max_interval: Duration,
    /// Polls allowed before giving up (including the first).
    pub max_polls: u32,
    /// Wall-clock budget measured from the start of polling.
    pub deadline: Option<Duration>,
    /// Consecutive failed polls tolerated before giving up.
    pub max_consecutive_indeterminate: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            backoff_factor: 2,
            max_interval: Duration::from_secs(5),
            max_polls: 30,
            deadline: Some(Duration::from_secs(60)),
            max_consecutive_indeterminate: 3,
        }
    }
}

impl PollPolicy {
    /// Fixed cadence without backoff, bounded only by `max_polls`.
    #[must_use]
    pub fn fixed(interval: Duration, max_polls: u32) -> Self {
        Self {
            initial_interval: interval,
            backoff_factor: 1,
            max_interval: interval,
            max_polls,
            deadline: None,
            ..Self::default()
        }
    }

    /// Wait preceding poll number `poll` (1-based).
    #[must_use]
    pub fn interval_before(&self, poll: u32) -> Duration {
        let factor = self
            .backoff_factor
            .max(1)
            .saturating_pow(poll.saturating_sub(1));
        let base_ms = u64::try_from(self.initial_interval.as_millis()).unwrap_or(u64::MAX);
        let max_ms = u64::try_from(self.max_interval.as_millis()).unwrap_or(u64::MAX);
        Duration::from_millis(base_ms.saturating_mul(u64::from(factor)).min(max_ms))
    }

    pub(super) fn poll_limit(&self) -> u32 {
        self.max_polls.max(1)
    }

    pub(super) fn indeterminate_limit(&self) -> u32 {
        self.max_consecutive_indeterminate.max(1)
    }
}
