//! Verb, path and body mapping for every remote operation.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::models::{
    AdminUserUpdate, ConfigItem, ConfigKey, Credentials, FlashSessionDraft, Password,
    PayOrderStatus, ReservationStatus, ReserveRequest, ReserveResultStatus, SystemConfig,
    UserRole, UserSelfUpdate,
};
use crate::domain::ports::{HttpMethod, RequestBody, TransportRequest};
use crate::domain::{ApiError, ApiErrorKind};
use crate::test_support::GatewayHarness;

struct ApiHarness {
    inner: GatewayHarness,
    client: ApiClient,
}

impl ApiHarness {
    fn only_request(&self) -> TransportRequest {
        let requests = self.inner.transport.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().expect("one request")
    }
}

#[fixture]
fn api() -> ApiHarness {
    let inner = GatewayHarness::new();
    let client = ApiClient::new(inner.gateway.clone());
    ApiHarness { inner, client }
}

fn account_json(id: i64, role: &str) -> serde_json::Value {
    json!({
        "id": id,
        "studentId": "20250001",
        "createTime": "2025-01-01 00:00:00",
        "updateTime": "2025-01-02 00:00:00",
        "userRole": role,
        "isActive": 1
    })
}

#[rstest]
#[tokio::test]
async fn login_posts_credentials_and_returns_token(api: ApiHarness) {
    api.inner.transport.push_data(json!("header.payload.sig"));

    let token = api
        .client
        .auth()
        .login(&Credentials::new("20250001", "pw"))
        .await
        .expect("login");

    assert_eq!(token.as_str(), "header.payload.sig");
    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/auth/login");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({"studentId": "20250001", "password": "pw"}))
    );
}

#[rstest]
#[tokio::test]
async fn register_posts_to_register(api: ApiHarness) {
    api.inner.transport.push_data(json!("fresh"));

    api.client
        .auth()
        .register(&Credentials::new("20250002", "pw"))
        .await
        .expect("register");

    assert_eq!(api.only_request().path, "/auth/register");
}

#[rstest]
#[tokio::test]
async fn update_me_omits_absent_fields(api: ApiHarness) {
    api.inner.transport.push_data(json!(null));
    let update = UserSelfUpdate {
        old_password: Some(Password::new("old")),
        new_password: Some(Password::new("new")),
        ..UserSelfUpdate::default()
    };

    api.client.user().update_me(&update).await.expect("update");

    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Patch);
    assert_eq!(request.path, "/user/me");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({"oldPassword": "old", "newPassword": "new"}))
    );
}

#[rstest]
#[tokio::test]
async fn me_decodes_account(api: ApiHarness) {
    api.inner.transport.push_data(account_json(7, "ADMIN"));

    let account = api.client.user().me().await.expect("me");

    assert_eq!(account.id, 7);
    assert_eq!(account.user_role, UserRole::Admin);
    assert!(account.is_active);
}

#[rstest]
#[tokio::test]
async fn slots_query_reaches_the_path(api: ApiHarness) {
    api.inner.transport.push_data(json!([]));
    let query = SlotQuery {
        court_ids: vec![1, 2],
        ..SlotQuery::for_session(4)
    };

    let slots = api.client.browse().slots(&query).await.expect("slots");

    assert!(slots.is_empty());
    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.path, "/browse/slot?sessionId=4&courtIds=1&courtIds=2");
    assert_eq!(request.body, RequestBody::Empty);
}

#[rstest]
#[case::no_filter(None, "/browse/court")]
#[case::name_filter(Some("East 1"), "/browse/court?courtNameLike=East+1")]
#[case::blank_filter(Some(""), "/browse/court")]
#[tokio::test]
async fn courts_filter(api: ApiHarness, #[case] name_like: Option<&str>, #[case] path: &str) {
    api.inner.transport.push_data(json!([]));

    api.client.browse().courts(name_like).await.expect("courts");

    assert_eq!(api.only_request().path, path);
}

#[rstest]
#[tokio::test]
async fn reservations_repeat_statuses(api: ApiHarness) {
    api.inner.transport.push_data(json!([{
        "id": 42,
        "userId": 1,
        "slotId": 9,
        "traceId": "t-1",
        "status": "PENDING_PAYMENT",
        "createTime": "2025-01-01 08:00:00",
        "updateTime": "2025-01-01 08:00:01",
        "isActive": true
    }]));
    let query = ReservationQuery {
        statuses: vec![ReservationStatus::PendingPayment],
        ..ReservationQuery::default()
    };

    let reservations = api
        .client
        .browse()
        .reservations(&query)
        .await
        .expect("reservations");

    assert_eq!(reservations[0].status, ReservationStatus::PendingPayment);
    assert_eq!(reservations[0].active_slot_id, None);
    assert_eq!(
        api.only_request().path,
        "/browse/reservation?statuses=PENDING_PAYMENT"
    );
}

#[rstest]
#[tokio::test]
async fn is_session_open_reads_a_flag(api: ApiHarness) {
    api.inner.transport.push_data(json!(true));

    assert!(api.client.browse().is_session_open(3).await.expect("open"));
    assert_eq!(api.only_request().path, "/browse/open/3");
}

#[rstest]
#[tokio::test]
async fn reserve_returns_trace(api: ApiHarness) {
    api.inner.transport.push_data(json!("t-123"));

    let trace = api
        .client
        .reserve()
        .reserve(&ReserveRequest {
            slot_id: 11,
            session_id: 2,
        })
        .await
        .expect("reserve");

    assert_eq!(trace, "t-123");
    let request = api.only_request();
    assert_eq!(request.path, "/reserve");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({"slotId": 11, "sessionId": 2}))
    );
}

#[rstest]
#[tokio::test]
async fn reserve_result_decodes_pending(api: ApiHarness) {
    api.inner
        .transport
        .push_data(json!({"traceId": "t-123", "status": "PENDING"}));

    let result = api
        .client
        .reserve()
        .reserve_result("t-123")
        .await
        .expect("result");

    assert_eq!(result.status, ReserveResultStatus::Pending);
    assert_eq!(result.reservation_id, None);
    assert_eq!(api.only_request().path, "/reserve/result/t-123");
}

#[rstest]
#[tokio::test]
async fn pay_result_with_payment(api: ApiHarness) {
    api.inner.transport.push_data(json!({
        "reservationId": 42,
        "outTradeNo": "NO42",
        "payChannel": "WECHAT",
        "payStatus": "PAYING",
        "reservationStatus": "PENDING_PAYMENT",
        "amount": "30.00",
        "expireTime": "2025-01-01 08:15:00",
        "updateTime": "2025-01-01 08:00:00"
    }));

    let result = api.client.pay().pay_result(42).await.expect("pay result");

    let payment = result.payment.expect("payment present");
    assert_eq!(payment.pay_status, PayOrderStatus::Paying);
    assert_eq!(api.only_request().path, "/pay/reservation/42");
}

#[rstest]
#[tokio::test]
async fn pay_result_with_partial_payment_is_rejected(api: ApiHarness) {
    api.inner.transport.push_data(json!({
        "reservationId": 42,
        "outTradeNo": "NO42",
        "reservationStatus": "PENDING_PAYMENT"
    }));

    let err = api
        .client
        .pay()
        .pay_result(42)
        .await
        .expect_err("partial payment");

    assert_eq!(err.kind(), ApiErrorKind::Transport);
    assert_eq!(api.inner.notifier.messages().len(), 1);
}

#[rstest]
#[tokio::test]
async fn update_config_value_sends_plain_text(api: ApiHarness) {
    api.inner.transport.push_data(json!(null));

    api.client
        .admin()
        .update_system_config_value(ConfigKey::PayAmount, "25")
        .await
        .expect("update");

    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Patch);
    assert_eq!(request.path, "/admin/system/PAY_AMOUNT");
    assert_eq!(request.body, RequestBody::Text("25".to_owned()));
}

#[rstest]
#[tokio::test]
async fn system_config_value_by_key(api: ApiHarness) {
    api.inner.transport.push_data(json!("15"));

    let value = api
        .client
        .admin()
        .system_config_value(ConfigKey::PayTimeoutMinute)
        .await
        .expect("value");

    assert_eq!(value, "15");
    assert_eq!(api.only_request().path, "/admin/system/PAY_TIMEOUT_MINUTE");
}

#[rstest]
#[tokio::test]
async fn update_system_config_sends_items(api: ApiHarness) {
    api.inner.transport.push_data(json!(null));
    let config = SystemConfig {
        config_items: vec![ConfigItem {
            config_key: ConfigKey::CourtCount,
            value: "8".to_owned(),
        }],
    };

    api.client
        .admin()
        .update_system_config(&config)
        .await
        .expect("update");

    assert_eq!(
        api.only_request().body,
        RequestBody::Json(json!({"configItems": [{"configKey": "COURT_COUNT", "value": "8"}]}))
    );
}

#[rstest]
#[tokio::test]
async fn create_user_serialises_role(api: ApiHarness) {
    api.inner.transport.push_data(json!(null));
    let body = AdminUserUpdate {
        student_id: Some("20259999".to_owned()),
        password: Some(Password::new("pw")),
        user_role: Some(UserRole::Admin),
    };

    api.client.admin().create_user(&body).await.expect("create");

    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/admin/users");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({"studentId": "20259999", "password": "pw", "userRole": "ADMIN"}))
    );
}

#[rstest]
#[tokio::test]
async fn update_session_patches_draft(api: ApiHarness) {
    api.inner.transport.push_data(json!(null));
    let draft = FlashSessionDraft {
        slot_interval: Some(60),
        ..FlashSessionDraft::default()
    };

    api.client
        .admin()
        .update_session(5, &draft)
        .await
        .expect("update");

    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Patch);
    assert_eq!(request.path, "/admin/session/5");
    assert_eq!(request.body, RequestBody::Json(json!({"slotInterval": 60})));
}

#[rstest]
#[tokio::test]
async fn users_lists_accounts(api: ApiHarness) {
    api.inner
        .transport
        .push_data(json!([account_json(1, "USER"), account_json(2, "ADMIN")]));

    let users = api.client.admin().users().await.expect("users");

    assert_eq!(users.len(), 2);
    assert_eq!(api.only_request().path, "/admin/users");
}

#[derive(Debug, Clone, Copy)]
enum VoidOp {
    DeleteMe,
    CancelReservation,
    MockPay,
    Refund,
    AddSession,
    DeleteSession,
    WarmupSession,
    OpenSession,
    GenerateSlots,
    UpdateUser,
    DeleteUser,
}

impl VoidOp {
    async fn run(self, client: &ApiClient) -> Result<(), ApiError> {
        match self {
            Self::DeleteMe => client.user().delete_me().await,
            Self::CancelReservation => client.reserve().cancel_reservation(42).await,
            Self::MockPay => client.pay().mock_wechat_pay_success("NO42").await,
            Self::Refund => client.pay().refund(42).await,
            Self::AddSession => client.admin().add_session(&FlashSessionDraft::default()).await,
            Self::DeleteSession => client.admin().delete_session(5).await,
            Self::WarmupSession => client.admin().warmup_session(5).await,
            Self::OpenSession => client.admin().open_session(5).await,
            Self::GenerateSlots => client.admin().generate_slots(5).await,
            Self::UpdateUser => {
                client
                    .admin()
                    .update_user(3, &AdminUserUpdate::default())
                    .await
            }
            Self::DeleteUser => client.admin().delete_user(3).await,
        }
    }
}

#[rstest]
#[case::delete_me(VoidOp::DeleteMe, HttpMethod::Delete, "/user/me")]
#[case::cancel(VoidOp::CancelReservation, HttpMethod::Delete, "/reserve/42")]
#[case::mock_pay(VoidOp::MockPay, HttpMethod::Post, "/pay/wechat/mock-success/NO42")]
#[case::refund(VoidOp::Refund, HttpMethod::Post, "/pay/refund/42")]
#[case::add_session(VoidOp::AddSession, HttpMethod::Post, "/admin/session")]
#[case::delete_session(VoidOp::DeleteSession, HttpMethod::Delete, "/admin/session/5")]
#[case::warmup(VoidOp::WarmupSession, HttpMethod::Post, "/admin/warmup/5")]
#[case::open(VoidOp::OpenSession, HttpMethod::Post, "/admin/open/5")]
#[case::slot_gen(VoidOp::GenerateSlots, HttpMethod::Post, "/admin/slot-gen/5")]
#[case::update_user(VoidOp::UpdateUser, HttpMethod::Patch, "/admin/users/3")]
#[case::delete_user(VoidOp::DeleteUser, HttpMethod::Delete, "/admin/users/3")]
#[tokio::test]
async fn void_operations_map_to_verb_and_path(
    api: ApiHarness,
    #[case] op: VoidOp,
    #[case] method: HttpMethod,
    #[case] path: &str,
) {
    // Void replies may carry any data; none of it is decoded.
    api.inner.transport.push_data(json!({"ignored": [1, 2]}));

    op.run(&api.client).await.expect("void call");

    let request = api.only_request();
    assert_eq!(request.method, method);
    assert_eq!(request.path, path);
}

#[rstest]
#[tokio::test]
async fn create_wechat_pay_decodes_parameters(api: ApiHarness) {
    api.inner.transport.push_data(json!({
        "reservationId": 42,
        "outTradeNo": "NO42",
        "prepayId": "wx1",
        "nonceStr": "n",
        "timeStamp": "1700000000",
        "packageValue": "prepay_id=wx1",
        "signType": "RSA",
        "paySign": "sig"
    }));

    let created = api.client.pay().create_wechat_pay(42).await.expect("create");

    assert_eq!(created.out_trade_no, "NO42");
    let request = api.only_request();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.path, "/pay/wechat/42");
    assert_eq!(request.body, RequestBody::Empty);
}
