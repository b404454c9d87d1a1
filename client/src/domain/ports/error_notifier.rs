//! Driven port for user-facing failure notices.
//!
//! The gateway emits exactly one notice per failed request. Presentation is
//! left to the adapter: a toast, a log line or stderr.

/// Sink for user-facing error messages.
#[cfg_attr(test, mockall::automock)]
pub trait ErrorNotifier: Send + Sync {
    /// Show `message` to the user.
    fn notify(&self, message: &str);
}

/// Notifier that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpErrorNotifier;

impl ErrorNotifier for NoOpErrorNotifier {
    fn notify(&self, _message: &str) {}
}
