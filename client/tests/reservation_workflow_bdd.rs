//! Behaviour tests for the reserve → poll → pay workflow.
//!
//! Server replies are scripted in the order the workflow consumes them, so
//! each `Given` step queues the next exchange.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use flashcourt::domain::models::{PayOrderStatus, ReservationStatus, ReserveRequest};
use flashcourt::domain::ports::TokenStore;
use flashcourt::domain::{SessionGate, TOKEN_EXPIRED, Token};
use flashcourt::test_support::{GatewayHarness, ImmediateSleeper, MutableClock, envelope_error};
use flashcourt::workflow::{
    PollPolicy, ReservationHandle, ReservationOutcome, ReservationWorkflow, WorkflowError,
};
use flashcourt::ApiClient;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use serde_json::json;
use tokio::runtime::Runtime;

const USER_TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJyb2xlIjoiVVNFUiJ9.sig";

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

#[derive(Clone)]
struct Harness(Arc<GatewayHarness>);

#[derive(Clone)]
struct Failure(Arc<WorkflowError>);

#[derive(Default, ScenarioState)]
struct ReservationWorld {
    runtime: Slot<RuntimeHandle>,
    harness: Slot<Harness>,
    trace: Slot<String>,
    granted: Slot<ReservationHandle>,
    rejected: Slot<String>,
    failure: Slot<Failure>,
}

impl ReservationWorld {
    fn runtime(&self) -> Arc<Runtime> {
        self.runtime.get().expect("runtime should be set").0
    }

    fn harness(&self) -> Arc<GatewayHarness> {
        self.harness.get().expect("harness should be set").0
    }

    fn trace(&self) -> String {
        self.trace.get().expect("trace should be scripted")
    }

    fn workflow(&self) -> ReservationWorkflow {
        let clock = Utc
            .with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
            .single()
            .expect("valid fixed time");
        ReservationWorkflow::with_sleeper(
            ApiClient::new(self.harness().gateway.clone()),
            Arc::new(MutableClock::new(clock)),
            Arc::new(ImmediateSleeper::default()),
            PollPolicy::fixed(Duration::from_millis(200), 10),
        )
    }

    fn granted(&self) -> ReservationHandle {
        self.granted.get().expect("reservation should be granted")
    }
}

#[fixture]
fn world() -> ReservationWorld {
    ReservationWorld::default()
}

#[given("a signed-in user")]
fn a_signed_in_user(world: &ReservationWorld) {
    let runtime = Runtime::new().expect("create runtime");
    let harness = GatewayHarness::new();
    harness
        .store
        .set(Token::new(USER_TOKEN))
        .expect("seed token");
    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
    world.harness.set(Harness(Arc::new(harness)));
}

#[given("the server issues trace {trace} for the submission")]
fn the_server_issues_trace(world: &ReservationWorld, trace: String) {
    let trace = trace.trim_matches('"').to_owned();
    world.harness().transport.push_data(json!(trace));
    world.trace.set(trace);
}

#[given("the server answers PENDING {count} times")]
fn the_server_answers_pending(world: &ReservationWorld, count: usize) {
    let harness = world.harness();
    for _ in 0..count {
        harness
            .transport
            .push_data(json!({"traceId": world.trace(), "status": "PENDING"}));
    }
}

#[given("the server then grants reservation {reservation_id} awaiting payment")]
fn the_server_grants(world: &ReservationWorld, reservation_id: i64) {
    world.harness().transport.push_data(json!({
        "traceId": world.trace(),
        "status": "SUCCESS",
        "reservationId": reservation_id,
        "reservationStatus": "PENDING_PAYMENT"
    }));
}

#[given("the server then rejects the attempt")]
fn the_server_rejects(world: &ReservationWorld) {
    world
        .harness()
        .transport
        .push_data(json!({"traceId": world.trace(), "status": "FAILED"}));
}

#[given("the server opens a payment order for reservation {reservation_id}")]
fn the_server_opens_a_payment_order(world: &ReservationWorld, reservation_id: i64) {
    let harness = world.harness();
    let out_trade_no = format!("NO{reservation_id}");
    harness.transport.push_data(json!({
        "reservationId": reservation_id,
        "outTradeNo": out_trade_no,
        "prepayId": "wx-prepay",
        "nonceStr": "nonce",
        "timeStamp": "1740816000",
        "packageValue": "prepay_id=wx-prepay",
        "signType": "RSA",
        "paySign": "signature"
    }));
    harness.transport.push_data(json!({
        "reservationId": reservation_id,
        "outTradeNo": out_trade_no,
        "payChannel": "WECHAT",
        "payStatus": "PAYING",
        "reservationStatus": "PENDING_PAYMENT",
        "amount": "30.00",
        "expireTime": "2025-03-01 08:15:00",
        "updateTime": "2025-03-01 08:00:00"
    }));
}

#[given("the server rejects {count} polls with an expired token")]
fn the_server_rejects_polls_with_expired_token(world: &ReservationWorld, count: usize) {
    let harness = world.harness();
    for _ in 0..count {
        harness.transport.push(Ok(envelope_error(
            401,
            401,
            TOKEN_EXPIRED,
            "session expired",
        )));
    }
}

#[when("the user reserves slot {slot_id} in session {session_id}")]
fn the_user_reserves(world: &ReservationWorld, slot_id: i64, session_id: i64) {
    let workflow = world.workflow();
    let request = ReserveRequest {
        slot_id,
        session_id,
    };
    match world.runtime().block_on(workflow.reserve(&request)) {
        Ok(ReservationOutcome::Granted(handle)) => world.granted.set(handle),
        Ok(ReservationOutcome::Rejected { trace }) => world.rejected.set(trace),
        Err(error) => world.failure.set(Failure(Arc::new(error))),
    }
}

#[when("the user pays for the reservation")]
fn the_user_pays(world: &ReservationWorld) {
    let handle = world.granted();
    let order = world
        .runtime()
        .block_on(handle.pay())
        .expect("payment order should be created");
    assert_eq!(order.reservation_id, handle.reservation_id());
}

#[then("reservation {reservation_id} is granted with status {status}")]
fn reservation_is_granted(world: &ReservationWorld, reservation_id: i64, status: String) {
    let handle = world.granted();
    let expected: ReservationStatus = status.parse().expect("known status");
    assert_eq!(handle.reservation_id(), reservation_id);
    assert_eq!(handle.status(), Some(expected));
    assert_eq!(handle.trace(), world.trace());
}

#[then("the trace was polled {count} times")]
fn the_trace_was_polled(world: &ReservationWorld, count: usize) {
    let poll_path = format!("/reserve/result/{}", world.trace());
    let polls = world
        .harness()
        .transport
        .paths()
        .iter()
        .filter(|path| **path == poll_path)
        .count();
    assert_eq!(polls, count);
}

#[then("the payment status of reservation {reservation_id} carries payment details")]
fn payment_status_carries_details(world: &ReservationWorld, reservation_id: i64) {
    let handle = world.granted();
    let result = world
        .runtime()
        .block_on(handle.payment_status())
        .expect("payment status should load");
    assert_eq!(result.reservation_id, reservation_id);
    let payment = result.payment.expect("payment fields should be present");
    assert_eq!(payment.pay_status, PayOrderStatus::Paying);
    assert_eq!(payment.out_trade_no, format!("NO{reservation_id}"));
    assert_eq!(world.harness().transport.remaining(), 0);
}

#[then("no reservation is granted")]
fn no_reservation_is_granted(world: &ReservationWorld) {
    assert!(world.granted.get().is_none());
    assert_eq!(world.rejected.get(), Some(world.trace()));
}

#[then("no payment operation was attempted")]
fn no_payment_operation_was_attempted(world: &ReservationWorld) {
    let paths = world.harness().transport.paths();
    assert!(
        paths.iter().all(|path| !path.starts_with("/pay")),
        "unexpected payment call in {paths:?}"
    );
}

#[then("the workflow gives up after {count} indeterminate polls")]
fn the_workflow_gives_up(world: &ReservationWorld, count: u32) {
    let failure = world.failure.get().expect("workflow should fail").0;
    match failure.as_ref() {
        WorkflowError::TooManyIndeterminate { failures, last, .. } => {
            assert_eq!(*failures, count);
            assert_eq!(last.enum_code(), Some(TOKEN_EXPIRED));
        }
        other => panic!("unexpected workflow error: {other:?}"),
    }
}

#[then("the user is signed out")]
fn the_user_is_signed_out(world: &ReservationWorld) {
    let harness = world.harness();
    let gate = SessionGate::new(harness.store.clone());
    assert!(!gate.restore_token().is_authenticated());
    assert_eq!(harness.notifier.messages().len(), 3);
}

#[scenario(
    path = "tests/features/reservation_workflow.feature",
    name = "A granted reservation is paid"
)]
fn a_granted_reservation_is_paid(world: ReservationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reservation_workflow.feature",
    name = "A failed reservation cannot be paid"
)]
fn a_failed_reservation_cannot_be_paid(world: ReservationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/reservation_workflow.feature",
    name = "An expired token during polling ends the session"
)]
fn an_expired_token_ends_the_session(world: ReservationWorld) {
    drop(world);
}
