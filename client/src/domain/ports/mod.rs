//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod error_notifier;
mod http_transport;
mod poll_sleeper;
mod token_store;

#[cfg(test)]
pub use error_notifier::MockErrorNotifier;
pub use error_notifier::{ErrorNotifier, NoOpErrorNotifier};
#[cfg(test)]
pub use http_transport::MockHttpTransport;
pub use http_transport::{
    HttpMethod, HttpTransport, RequestBody, TransportFailure, TransportRequest, TransportResponse,
};
#[cfg(test)]
pub use poll_sleeper::MockPollSleeper;
pub use poll_sleeper::PollSleeper;
#[cfg(test)]
pub use token_store::MockTokenStore;
pub use token_store::{MemoryTokenStore, TokenStore, TokenStoreError, role_of};
