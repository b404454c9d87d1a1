//! Error notifier writing notices to the tracing pipeline.

use tracing::warn;

use crate::domain::ports::ErrorNotifier;

/// Emits each notice as a `warn!` event on the `flashcourt::notice` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorNotifier;

impl ErrorNotifier for TracingErrorNotifier {
    fn notify(&self, message: &str) {
        warn!(target: "flashcourt::notice", %message, "request failed");
    }
}
