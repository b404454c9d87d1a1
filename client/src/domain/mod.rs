//! Domain types, policies and ports for the reservation client.
//!
//! Nothing in here performs I/O directly. Network, storage and presentation
//! are reached through the traits in [`ports`], which the `outbound` module
//! implements.

pub mod envelope;
pub mod error;
pub mod gateway;
pub mod models;
pub mod ports;
pub mod reservation;
pub mod session_gate;
pub mod token;

pub use self::envelope::{ResponseBody, ResponseEnvelope, SUCCESS_CODE};
pub use self::error::{
    ApiError, ApiErrorKind, SENTINEL_CODE, TOKEN_EXPIRED, TOKEN_INVALID, invalidates_token,
};
pub use self::gateway::{ApiGateway, NoContent};
pub use self::reservation::{AttemptTransitionError, ReserveAttemptState};
pub use self::session_gate::{
    HOME_PATH, LOGIN_PATH, NavigationDecision, SessionGate, SessionSnapshot,
};
pub use self::token::{Role, Token};
