//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **reqwest_transport**: HTTP exchange over reqwest
//! - **file_token_store**: token persistence in a cap-std directory
//! - **tracing_notifier**: user-facing notices routed through tracing
//!
//! Adapters are thin translators. They contain no request policy.

pub mod file_token_store;
pub mod reqwest_transport;
pub mod tracing_notifier;

pub use file_token_store::FileTokenStore;
pub use reqwest_transport::{DEFAULT_REQUEST_TIMEOUT, ReqwestTransport};
pub use tracing_notifier::TracingErrorNotifier;
