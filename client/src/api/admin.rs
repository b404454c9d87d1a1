//! Administration: system configuration, sessions and accounts.

use crate::domain::models::{
    AdminUserUpdate, ConfigKey, EntityId, FlashSessionDraft, SystemConfig, UserAccount,
};
use crate::domain::{ApiError, ApiGateway, NoContent};

/// `/admin` operations. The server rejects them for non-admin tokens.
pub struct AdminApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Entire system configuration.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn system_config(&self) -> Result<SystemConfig, ApiError> {
        self.gateway.get("/admin/system").await
    }

    /// One configuration value.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn system_config_value(&self, key: ConfigKey) -> Result<String, ApiError> {
        self.gateway.get(&format!("/admin/system/{key}")).await
    }

    /// Replace several configuration values.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn update_system_config(&self, config: &SystemConfig) -> Result<(), ApiError> {
        self.gateway
            .patch::<NoContent, _>("/admin/system", config)
            .await
            .map(drop)
    }

    /// Replace one configuration value. The value is sent as `text/plain`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn update_system_config_value(
        &self,
        key: ConfigKey,
        value: &str,
    ) -> Result<(), ApiError> {
        self.gateway
            .patch_text::<NoContent>(&format!("/admin/system/{key}"), value)
            .await
            .map(drop)
    }

    /// Create a flash session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn add_session(&self, draft: &FlashSessionDraft) -> Result<(), ApiError> {
        self.void_post_json("/admin/session", draft).await
    }

    /// Update a flash session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn update_session(
        &self,
        id: EntityId,
        draft: &FlashSessionDraft,
    ) -> Result<(), ApiError> {
        self.gateway
            .patch::<NoContent, _>(&format!("/admin/session/{id}"), draft)
            .await
            .map(drop)
    }

    /// Delete a flash session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn delete_session(&self, id: EntityId) -> Result<(), ApiError> {
        self.void_delete(&format!("/admin/session/{id}")).await
    }

    /// Preload caches ahead of a session opening.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn warmup_session(&self, session_id: EntityId) -> Result<(), ApiError> {
        self.void_post(&format!("/admin/warmup/{session_id}")).await
    }

    /// Open a session for booking immediately.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn open_session(&self, session_id: EntityId) -> Result<(), ApiError> {
        self.void_post(&format!("/admin/open/{session_id}")).await
    }

    /// Generate the time slots of a session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn generate_slots(&self, session_id: EntityId) -> Result<(), ApiError> {
        self.void_post(&format!("/admin/slot-gen/{session_id}")).await
    }

    /// All accounts.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn users(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.gateway.get("/admin/users").await
    }

    /// One account.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn user(&self, id: EntityId) -> Result<UserAccount, ApiError> {
        self.gateway.get(&format!("/admin/users/{id}")).await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn create_user(&self, body: &AdminUserUpdate) -> Result<(), ApiError> {
        self.void_post_json("/admin/users", body).await
    }

    /// Update an account.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn update_user(&self, id: EntityId, body: &AdminUserUpdate) -> Result<(), ApiError> {
        self.gateway
            .patch::<NoContent, _>(&format!("/admin/users/{id}"), body)
            .await
            .map(drop)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn delete_user(&self, id: EntityId) -> Result<(), ApiError> {
        self.void_delete(&format!("/admin/users/{id}")).await
    }

    async fn void_post(&self, path: &str) -> Result<(), ApiError> {
        self.gateway.post_empty::<NoContent>(path).await.map(drop)
    }

    async fn void_post_json<B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        self.gateway.post::<NoContent, _>(path, body).await.map(drop)
    }

    async fn void_delete(&self, path: &str) -> Result<(), ApiError> {
        self.gateway.delete::<NoContent>(path).await.map(drop)
    }
}
