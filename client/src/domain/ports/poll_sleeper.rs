//! Driven port for waiting between reservation polls.

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the polling workflow between attempts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PollSleeper: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration);
}
