//! Self-service account operations.

use crate::domain::models::{UserAccount, UserSelfUpdate};
use crate::domain::{ApiError, ApiGateway, NoContent};

/// `/user/me` operations.
pub struct UserApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> UserApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Profile of the signed-in account.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn me(&self) -> Result<UserAccount, ApiError> {
        self.gateway.get("/user/me").await
    }

    /// Change the student number or password.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn update_me(&self, update: &UserSelfUpdate) -> Result<(), ApiError> {
        self.gateway
            .patch::<NoContent, _>("/user/me", update)
            .await
            .map(drop)
    }

    /// Delete the signed-in account.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn delete_me(&self) -> Result<(), ApiError> {
        self.gateway.delete::<NoContent>("/user/me").await.map(drop)
    }
}
