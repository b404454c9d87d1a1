//! Typed remote operations grouped by server area.
//!
//! Each group borrows the shared [`ApiGateway`] and maps an operation to a
//! verb, a path and an optional body or query. No group adds policy of its
//! own; auth, envelope and error handling all live in the gateway.

use std::sync::Arc;

use crate::domain::ApiGateway;

mod admin;
mod auth;
mod browse;
mod pay;
mod reserve;
mod user;

pub use admin::AdminApi;
pub use auth::AuthApi;
pub use browse::{BrowseApi, ReservationQuery, SessionQuery, SlotQuery};
pub use pay::PayApi;
pub use reserve::ReserveApi;
pub use user::UserApi;

/// Entry point to every remote operation.
///
/// Cheap to clone; clones share one gateway.
#[derive(Clone)]
pub struct ApiClient {
    gateway: Arc<ApiGateway>,
}

impl ApiClient {
    /// Wrap a gateway.
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    /// Underlying gateway.
    #[must_use]
    pub fn gateway(&self) -> &Arc<ApiGateway> {
        &self.gateway
    }

    /// Registration and login.
    #[must_use]
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.gateway)
    }

    /// The signed-in account.
    #[must_use]
    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(&self.gateway)
    }

    /// Read-only catalogue of sessions, courts, slots and reservations.
    #[must_use]
    pub fn browse(&self) -> BrowseApi<'_> {
        BrowseApi::new(&self.gateway)
    }

    /// Reservation attempts.
    #[must_use]
    pub fn reserve(&self) -> ReserveApi<'_> {
        ReserveApi::new(&self.gateway)
    }

    /// Payments and refunds.
    #[must_use]
    pub fn pay(&self) -> PayApi<'_> {
        PayApi::new(&self.gateway)
    }

    /// Administration.
    #[must_use]
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(&self.gateway)
    }
}

#[cfg(test)]
mod tests;
