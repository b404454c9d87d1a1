//! Reserve → poll → pay driver.
//!
//! A reservation submission returns a trace. [`ReservationWorkflow`] polls
//! that trace under a [`PollPolicy`] until the server settles it, folding
//! each answer through [`ReserveAttemptState::observe`]. A failed poll says
//! nothing about the outcome; it is counted as indeterminate and polling
//! continues until the policy gives up.
//!
//! Only a granted attempt yields a [`ReservationHandle`], so payment and
//! cancellation calls cannot be made without a reservation id.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use mockable::Clock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::domain::models::{
    EntityId, PayOrderResult, ReservationStatus, ReserveRequest, WechatPayCreate,
};
use crate::domain::ports::PollSleeper;
use crate::domain::{ApiError, AttemptTransitionError, ReserveAttemptState};

mod policy;
mod runtime;

pub use policy::PollPolicy;
pub use runtime::TokioSleeper;

/// Reasons the workflow stopped without a settled outcome.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The submission itself was rejected.
    #[error("reservation submission failed: {0}")]
    Submit(#[source] ApiError),
    /// A poll answer did not fit the attempt state machine.
    #[error(transparent)]
    Transition(#[from] AttemptTransitionError),
    /// Every allowed poll answered `PENDING` or failed.
    #[error("no result for {trace} after {polls} polls")]
    PollsExhausted {
        /// Trace being polled.
        trace: String,
        /// Polls performed.
        polls: u32,
    },
    /// The wall-clock budget ran out.
    #[error("no result for {trace} within {budget:?}")]
    DeadlineExceeded {
        /// Trace being polled.
        trace: String,
        /// Configured budget.
        budget: Duration,
    },
    /// Too many polls in a row failed to reach the server.
    #[error("{failures} consecutive polls of {trace} failed: {last}")]
    TooManyIndeterminate {
        /// Trace being polled.
        trace: String,
        /// Consecutive failures.
        failures: u32,
        /// Most recent failure.
        #[source]
        last: ApiError,
    },
}

impl WorkflowError {
    /// Trace the error refers to, once one exists.
    #[must_use]
    pub fn trace(&self) -> Option<&str> {
        match self {
            Self::Submit(_) => None,
            Self::Transition(
                AttemptTransitionError::AlreadySettled { trace, .. }
                | AttemptTransitionError::MissingReservationId { trace },
            )
            | Self::PollsExhausted { trace, .. }
            | Self::DeadlineExceeded { trace, .. }
            | Self::TooManyIndeterminate { trace, .. } => Some(trace),
        }
    }
}

/// Result of a single poll.
#[derive(Debug)]
pub enum PollOutcome {
    /// The server answered and the attempt moved to this state.
    Observed(ReserveAttemptState),
    /// The poll failed; the attempt state is unchanged.
    Indeterminate(ApiError),
}

/// Settled outcome of a reservation attempt.
#[derive(Debug)]
pub enum ReservationOutcome {
    /// A reservation was granted.
    Granted(ReservationHandle),
    /// The attempt was rejected; no reservation exists.
    Rejected {
        /// Trace of the rejected attempt.
        trace: String,
    },
}

impl ReservationOutcome {
    /// Handle of the granted reservation.
    #[must_use]
    pub fn handle(&self) -> Option<&ReservationHandle> {
        match self {
            Self::Granted(handle) => Some(handle),
            Self::Rejected { .. } => None,
        }
    }

    /// Consume the outcome, keeping the handle of a grant.
    #[must_use]
    pub fn into_handle(self) -> Option<ReservationHandle> {
        match self {
            Self::Granted(handle) => Some(handle),
            Self::Rejected { .. } => None,
        }
    }

    /// Trace the outcome settles.
    #[must_use]
    pub fn trace(&self) -> &str {
        match self {
            Self::Granted(handle) => handle.trace(),
            Self::Rejected { trace } => trace,
        }
    }
}

/// Granted reservation and the operations keyed by its id.
#[derive(Clone)]
pub struct ReservationHandle {
    api: ApiClient,
    trace: String,
    reservation_id: EntityId,
    status: Option<ReservationStatus>,
}

impl fmt::Debug for ReservationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReservationHandle")
            .field("trace", &self.trace)
            .field("reservation_id", &self.reservation_id)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl ReservationHandle {
    /// Trace that produced the reservation.
    #[must_use]
    pub fn trace(&self) -> &str {
        &self.trace
    }

    /// Granted reservation id.
    #[must_use]
    pub fn reservation_id(&self) -> EntityId {
        self.reservation_id
    }

    /// Lifecycle reported alongside the grant.
    #[must_use]
    pub fn status(&self) -> Option<ReservationStatus> {
        self.status
    }

    /// Open a WeChat payment order.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn pay(&self) -> Result<WechatPayCreate, ApiError> {
        self.api.pay().create_wechat_pay(self.reservation_id).await
    }

    /// Current payment view.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn payment_status(&self) -> Result<PayOrderResult, ApiError> {
        self.api.pay().pay_result(self.reservation_id).await
    }

    /// Cancel the reservation.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn cancel(&self) -> Result<(), ApiError> {
        self.api
            .reserve()
            .cancel_reservation(self.reservation_id)
            .await
    }

    /// Refund a paid reservation.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn refund(&self) -> Result<(), ApiError> {
        self.api.pay().refund(self.reservation_id).await
    }
}

/// Drives one reservation attempt from submission to settlement.
pub struct ReservationWorkflow {
    api: ApiClient,
    clock: Arc<dyn Clock>,
    sleeper: Arc<dyn PollSleeper>,
    policy: PollPolicy,
}

impl ReservationWorkflow {
    /// Workflow sleeping on the tokio timer.
    pub fn new(api: ApiClient, clock: Arc<dyn Clock>, policy: PollPolicy) -> Self {
        Self::with_sleeper(api, clock, Arc::new(TokioSleeper), policy)
    }

    /// Workflow with an injected sleeper.
    pub fn with_sleeper(
        api: ApiClient,
        clock: Arc<dyn Clock>,
        sleeper: Arc<dyn PollSleeper>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            api,
            clock,
            sleeper,
            policy,
        }
    }

    /// Active policy.
    #[must_use]
    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Submit an attempt. The submission is never retried.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Submit`] when the server rejects the submission.
    pub async fn submit(
        &self,
        request: &ReserveRequest,
    ) -> Result<ReserveAttemptState, WorkflowError> {
        let trace = self
            .api
            .reserve()
            .reserve(request)
            .await
            .map_err(WorkflowError::Submit)?;
        info!(%trace, slot_id = request.slot_id, "reservation submitted");
        Ok(ReserveAttemptState::submitted(trace))
    }

    /// Poll `state`'s trace once.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Transition`] when the answer does not fit the state
    /// machine. A failed request is not an error here; it is reported as
    /// [`PollOutcome::Indeterminate`].
    pub async fn poll_once(
        &self,
        state: &ReserveAttemptState,
    ) -> Result<PollOutcome, WorkflowError> {
        match self.api.reserve().reserve_result(state.trace()).await {
            Ok(result) => {
                let next = state.clone().observe(&result)?;
                debug!(
                    trace = state.trace(),
                    status = %result.status,
                    settled = next.is_terminal(),
                    "poll answered"
                );
                Ok(PollOutcome::Observed(next))
            }
            Err(error) => {
                warn!(trace = state.trace(), %error, "poll failed; outcome unknown");
                Ok(PollOutcome::Indeterminate(error))
            }
        }
    }

    /// Poll `trace` until it settles or the policy gives up.
    ///
    /// # Errors
    ///
    /// [`WorkflowError`] when the policy gives up or an answer is invalid.
    /// A `FAILED` answer is not an error; it yields
    /// [`ReservationOutcome::Rejected`].
    pub async fn await_result(
        &self,
        trace: impl Into<String>,
    ) -> Result<ReservationOutcome, WorkflowError> {
        let mut state = ReserveAttemptState::submitted(trace);
        let started = self.clock.utc();
        let mut polls = 0_u32;
        let mut failures = 0_u32;

        loop {
            if polls >= self.policy.poll_limit() {
                return Err(WorkflowError::PollsExhausted {
                    trace: state.trace().to_owned(),
                    polls,
                });
            }
            polls += 1;
            let wait = self.wait_before(polls, started, state.trace())?;
            self.sleeper.sleep(wait).await;

            match self.poll_once(&state).await? {
                PollOutcome::Observed(next) => {
                    failures = 0;
                    state = next;
                }
                PollOutcome::Indeterminate(error) => {
                    failures += 1;
                    if failures >= self.policy.indeterminate_limit() {
                        return Err(WorkflowError::TooManyIndeterminate {
                            trace: state.trace().to_owned(),
                            failures,
                            last: error,
                        });
                    }
                    continue;
                }
            }

            match state {
                ReserveAttemptState::ResultSuccess {
                    trace,
                    reservation_id,
                    reservation_status,
                } => {
                    info!(%trace, reservation_id, "reservation granted");
                    return Ok(ReservationOutcome::Granted(ReservationHandle {
                        api: self.api.clone(),
                        trace,
                        reservation_id,
                        status: reservation_status,
                    }));
                }
                ReserveAttemptState::ResultFailed { trace } => {
                    info!(%trace, "reservation rejected");
                    return Ok(ReservationOutcome::Rejected { trace });
                }
                pending @ (ReserveAttemptState::Submitted { .. }
                | ReserveAttemptState::ResultPending { .. }) => state = pending,
            }
        }
    }

    /// Submit `request` and poll its trace to settlement.
    ///
    /// # Errors
    ///
    /// As [`ReservationWorkflow::submit`] and
    /// [`ReservationWorkflow::await_result`].
    pub async fn reserve(
        &self,
        request: &ReserveRequest,
    ) -> Result<ReservationOutcome, WorkflowError> {
        let submitted = self.submit(request).await?;
        self.await_result(submitted.trace()).await
    }

    fn wait_before(
        &self,
        poll: u32,
        started: chrono::DateTime<chrono::Utc>,
        trace: &str,
    ) -> Result<Duration, WorkflowError> {
        let interval = self.policy.interval_before(poll);
        let Some(budget) = self.policy.deadline else {
            return Ok(interval);
        };
        let elapsed = (self.clock.utc() - started)
            .to_std()
            .unwrap_or(Duration::ZERO);
        match budget.checked_sub(elapsed) {
            Some(remaining) if !remaining.is_zero() => Ok(interval.min(remaining)),
            _ => Err(WorkflowError::DeadlineExceeded {
                trace: trace.to_owned(),
                budget,
            }),
        }
    }
}
