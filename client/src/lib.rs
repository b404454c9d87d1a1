//! Client core for the flash court reservation service.
//!
//! The crate is laid out as a small hexagon:
//!
//! - [`domain`] owns the token, role, envelope and error types, the
//!   reservation state machine, the session gate, the transport gateway and
//!   the ports it drives.
//! - [`api`] maps each remote operation to a verb and path on top of the
//!   gateway.
//! - [`workflow`] drives the reserve → poll → pay protocol.
//! - [`outbound`] holds the reqwest transport, the file-backed token store
//!   and the tracing notifier.
//! - [`config`] loads client settings via OrthoConfig.

pub mod api;
pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod workflow;

pub use api::ApiClient;
pub use domain::{ApiError, ApiErrorKind, ApiGateway, Role, SessionGate, Token};
