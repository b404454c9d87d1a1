//! Reservation attempts.
//!
//! A submission only returns a trace. Whether it produced a reservation is
//! learnt later through [`ReserveApi::reserve_result`]; the `workflow`
//! module drives that loop.

use crate::domain::models::{EntityId, ReserveRequest, ReserveResult};
use crate::domain::{ApiError, ApiGateway, NoContent};

/// `/reserve` operations.
pub struct ReserveApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> ReserveApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Submit an attempt and return its trace.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn reserve(&self, request: &ReserveRequest) -> Result<String, ApiError> {
        self.gateway.post("/reserve", request).await
    }

    /// Current settlement state of a trace.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn reserve_result(&self, trace: &str) -> Result<ReserveResult, ApiError> {
        self.gateway.get(&format!("/reserve/result/{trace}")).await
    }

    /// Cancel a granted reservation.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn cancel_reservation(&self, reservation_id: EntityId) -> Result<(), ApiError> {
        self.gateway
            .delete::<NoContent>(&format!("/reserve/{reservation_id}"))
            .await
            .map(drop)
    }
}
