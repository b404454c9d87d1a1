//! Shared test doubles for gateway, workflow and integration tests.
//!
//! Compiled for unit tests and behind the `test-support` feature so the
//! `tests/` suites can script server replies without a network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use camino::Utf8Path;
use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::ApiGateway;
use crate::domain::ports::{
    ErrorNotifier, HttpTransport, MemoryTokenStore, PollSleeper, TokenStore, TransportFailure,
    TransportRequest, TransportResponse,
};
use crate::outbound::FileTokenStore;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}

type ScriptedReply = Result<TransportResponse, TransportFailure>;

/// Transport replaying queued replies and recording every request.
///
/// An exhausted script answers with a connection failure naming the
/// unexpected request.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    /// Empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw reply or failure.
    pub fn push(&self, reply: ScriptedReply) -> &Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Queue a `200 {code:200, data}` reply.
    pub fn push_data(&self, data: Value) -> &Self {
        self.push(Ok(envelope_ok(data)))
    }

    /// Requests seen so far, in dispatch order.
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }

    /// Paths requested so far, in dispatch order.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        lock(&self.requests)
            .iter()
            .map(|request| request.path.clone())
            .collect()
    }

    /// Number of queued replies not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure> {
        let description = format!("{} {}", request.method, request.path);
        lock(&self.requests).push(request);
        lock(&self.replies).pop_front().unwrap_or_else(|| {
            Err(TransportFailure::connection(format!(
                "no scripted reply for {description}"
            )))
        })
    }
}

/// HTTP 200 reply wrapping `data` in a success envelope.
#[must_use]
pub fn envelope_ok(data: Value) -> TransportResponse {
    envelope_reply(200, json!({"code": 200, "enumCode": "SUCCESS", "message": "ok", "data": data}))
}

/// Reply with the given HTTP status and a failure envelope.
#[must_use]
pub fn envelope_error(status: u16, code: i64, enum_code: &str, message: &str) -> TransportResponse {
    envelope_reply(
        status,
        json!({"code": code, "enumCode": enum_code, "message": message, "data": null}),
    )
}

/// Reply with the given HTTP status and JSON body.
#[must_use]
pub fn envelope_reply(status: u16, body: Value) -> TransportResponse {
    TransportResponse {
        status,
        authorization: None,
        body: body.to_string().into_bytes(),
    }
}

/// Notifier keeping every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        lock(&self.messages).clone()
    }
}

impl ErrorNotifier for RecordingNotifier {
    fn notify(&self, message: &str) {
        lock(&self.messages).push(message.to_owned());
    }
}

/// Sleeper that returns at once and records requested durations.
#[derive(Debug, Default)]
pub struct ImmediateSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl ImmediateSleeper {
    /// Durations requested so far.
    #[must_use]
    pub fn slept(&self) -> Vec<Duration> {
        lock(&self.slept).clone()
    }
}

#[async_trait]
impl PollSleeper for ImmediateSleeper {
    async fn sleep(&self, duration: Duration) {
        lock(&self.slept).push(duration);
    }
}

/// Sleeper that advances a [`MutableClock`] instead of waiting.
pub struct ClockAdvancingSleeper {
    clock: Arc<MutableClock>,
}

impl ClockAdvancingSleeper {
    /// Advance `clock` on every sleep.
    #[must_use]
    pub fn new(clock: Arc<MutableClock>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl PollSleeper for ClockAdvancingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.clock.advance(duration);
    }
}

/// Clock whose time only moves when told to.
#[derive(Debug)]
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    /// Clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => panic!("duration out of range: {error}; delta={delta:?}"),
        };
        *lock(&self.0) += delta;
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Gateway wired to scripted doubles.
pub struct GatewayHarness {
    /// Scripted transport.
    pub transport: Arc<ScriptedTransport>,
    /// In-memory token store.
    pub store: Arc<MemoryTokenStore>,
    /// Recording notifier.
    pub notifier: Arc<RecordingNotifier>,
    /// Gateway under test.
    pub gateway: Arc<ApiGateway>,
}

impl GatewayHarness {
    /// Fresh harness with an empty token store.
    #[must_use]
    pub fn new() -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(MemoryTokenStore::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let gateway = Arc::new(ApiGateway::new(
            transport.clone(),
            store.clone() as Arc<dyn TokenStore>,
            notifier.clone(),
        ));
        Self {
            transport,
            store,
            notifier,
            gateway,
        }
    }
}

impl Default for GatewayHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// File-backed token store rooted in a fresh temporary directory.
///
/// Keep the returned directory alive for as long as the store is used.
#[must_use]
pub fn temp_file_token_store() -> (tempfile::TempDir, FileTokenStore) {
    let dir = match tempfile::tempdir() {
        Ok(dir) => dir,
        Err(error) => panic!("create temp dir: {error}"),
    };
    let Some(path) = Utf8Path::from_path(dir.path()) else {
        panic!("temp dir path is not UTF-8: {}", dir.path().display());
    };
    let store = match FileTokenStore::open(path, FileTokenStore::DEFAULT_KEY) {
        Ok(store) => store,
        Err(error) => panic!("open token store: {error}"),
    };
    (dir, store)
}
