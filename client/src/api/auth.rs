//! Registration and login.

use crate::domain::models::Credentials;
use crate::domain::{ApiError, ApiGateway, Token};

/// `/auth` operations.
pub struct AuthApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Create an account and return its first token.
    ///
    /// The token is returned, not stored; pass it to
    /// [`SessionGate::save_token`](crate::domain::SessionGate::save_token).
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn register(&self, credentials: &Credentials) -> Result<Token, ApiError> {
        let raw: String = self.gateway.post("/auth/register", credentials).await?;
        Ok(Token::new(raw))
    }

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn login(&self, credentials: &Credentials) -> Result<Token, ApiError> {
        let raw: String = self.gateway.post("/auth/login", credentials).await?;
        Ok(Token::new(raw))
    }
}
