//! Production sleeper for the polling loop.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::ports::PollSleeper;

/// Tokio-based sleeper implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl PollSleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
