//! Payment operations keyed by reservation.

use crate::domain::models::{EntityId, PayOrderResult, WechatPayCreate};
use crate::domain::{ApiError, ApiGateway, NoContent};

/// `/pay` operations.
pub struct PayApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> PayApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Create a WeChat payment order for a reservation.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn create_wechat_pay(
        &self,
        reservation_id: EntityId,
    ) -> Result<WechatPayCreate, ApiError> {
        self.gateway
            .post_empty(&format!("/pay/wechat/{reservation_id}"))
            .await
    }

    /// Mark an order as paid on servers running the mock provider.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn mock_wechat_pay_success(&self, out_trade_no: &str) -> Result<(), ApiError> {
        self.gateway
            .post_empty::<NoContent>(&format!("/pay/wechat/mock-success/{out_trade_no}"))
            .await
            .map(drop)
    }

    /// Refund a paid reservation.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn refund(&self, reservation_id: EntityId) -> Result<(), ApiError> {
        self.gateway
            .post_empty::<NoContent>(&format!("/pay/refund/{reservation_id}"))
            .await
            .map(drop)
    }

    /// Payment view of a reservation.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway, including a transport-class
    /// error when payment fields are only partly present.
    pub async fn pay_result(&self, reservation_id: EntityId) -> Result<PayOrderResult, ApiError> {
        self.gateway
            .get(&format!("/pay/reservation/{reservation_id}"))
            .await
    }
}
