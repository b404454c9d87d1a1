//! Reservation attempt, reservation and payment state machines.
//!
//! A reservation attempt is submitted once and then observed by polling its
//! trace. [`ReserveAttemptState::observe`] folds each poll answer into the
//! attempt state following a fixed transition table; anything outside the
//! table is an [`AttemptTransitionError`].
//!
//! ```text
//! Submitted ──PENDING──▶ ResultPending(1) ──PENDING──▶ ResultPending(n+1)
//!     │                        │
//!     ├──SUCCESS(id)──▶ ResultSuccess ◀──SUCCESS(id)──┤
//!     └──FAILED──────▶ ResultFailed  ◀──FAILED───────┘
//! ```

use thiserror::Error;

use super::models::{
    EntityId, PayOrderStatus, ReservationStatus, ReserveResult, ReserveResultStatus,
};

/// Client-side view of one reservation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReserveAttemptState {
    /// Accepted by the server; no poll answer seen yet.
    Submitted {
        /// Trace returned by the submission.
        trace: String,
    },
    /// At least one poll answered `PENDING`.
    ResultPending {
        /// Trace being polled.
        trace: String,
        /// Number of `PENDING` answers seen.
        polls: u32,
    },
    /// A reservation was granted.
    ResultSuccess {
        /// Trace that was polled.
        trace: String,
        /// Granted reservation.
        reservation_id: EntityId,
        /// Lifecycle reported with the grant.
        reservation_status: Option<ReservationStatus>,
    },
    /// The attempt was rejected; no reservation exists.
    ResultFailed {
        /// Trace that was polled.
        trace: String,
    },
}

/// Poll answers that do not fit the transition table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptTransitionError {
    /// The attempt already reached a terminal state.
    #[error("attempt {trace} is already settled; cannot observe {observed}")]
    AlreadySettled {
        /// Trace of the settled attempt.
        trace: String,
        /// Status that was observed.
        observed: ReserveResultStatus,
    },
    /// The server reported success without a reservation id.
    #[error("attempt {trace} succeeded without a reservation id")]
    MissingReservationId {
        /// Trace of the attempt.
        trace: String,
    },
}

impl ReserveAttemptState {
    /// Freshly submitted attempt.
    pub fn submitted(trace: impl Into<String>) -> Self {
        Self::Submitted {
            trace: trace.into(),
        }
    }

    /// Trace identifying this attempt.
    #[must_use]
    pub fn trace(&self) -> &str {
        match self {
            Self::Submitted { trace }
            | Self::ResultPending { trace, .. }
            | Self::ResultSuccess { trace, .. }
            | Self::ResultFailed { trace } => trace,
        }
    }

    /// Whether the attempt is settled.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResultSuccess { .. } | Self::ResultFailed { .. })
    }

    /// Fold one poll answer into the state.
    ///
    /// # Examples
    /// ```
    /// use flashcourt::domain::ReserveAttemptState;
    /// use flashcourt::domain::models::{ReserveResult, ReserveResultStatus};
    ///
    /// let pending = ReserveResult {
    ///     trace_id: "t-1".into(),
    ///     status: ReserveResultStatus::Pending,
    ///     reservation_id: None,
    ///     reservation_status: None,
    /// };
    /// let state = ReserveAttemptState::submitted("t-1").observe(&pending)?;
    /// assert_eq!(state, ReserveAttemptState::ResultPending { trace: "t-1".into(), polls: 1 });
    /// # Ok::<(), flashcourt::domain::AttemptTransitionError>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`AttemptTransitionError`] when the state is terminal or a
    /// success answer lacks a reservation id.
    pub fn observe(self, result: &ReserveResult) -> Result<Self, AttemptTransitionError> {
        match (self, result.status) {
            (state @ (Self::ResultSuccess { .. } | Self::ResultFailed { .. }), observed) => {
                Err(AttemptTransitionError::AlreadySettled {
                    trace: state.trace().to_owned(),
                    observed,
                })
            }
            (Self::Submitted { trace }, ReserveResultStatus::Pending) => {
                Ok(Self::ResultPending { trace, polls: 1 })
            }
            (Self::ResultPending { trace, polls }, ReserveResultStatus::Pending) => {
                Ok(Self::ResultPending {
                    trace,
                    polls: polls.saturating_add(1),
                })
            }
            (state, ReserveResultStatus::Success) => {
                let trace = state.trace().to_owned();
                match result.reservation_id {
                    Some(reservation_id) => Ok(Self::ResultSuccess {
                        trace,
                        reservation_id,
                        reservation_status: result.reservation_status,
                    }),
                    None => Err(AttemptTransitionError::MissingReservationId { trace }),
                }
            }
            (state, ReserveResultStatus::Failed) => Ok(Self::ResultFailed {
                trace: state.trace().to_owned(),
            }),
        }
    }
}

impl ReservationStatus {
    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// `PENDING → PENDING_PAYMENT → {CONFIRMED | CANCELLED}`; a pending
    /// reservation may also be cancelled directly.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::PendingPayment | Self::Cancelled)
                | (Self::PendingPayment, Self::Confirmed | Self::Cancelled)
        )
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl PayOrderStatus {
    /// Whether an order may move from `self` to `next`.
    ///
    /// `PAYING → {SUCCESS | REFUNDED | CLOSED | FAILED}` and `SUCCESS →
    /// REFUNDED`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Paying,
                Self::Success | Self::Refunded | Self::Closed | Self::Failed
            ) | (Self::Success, Self::Refunded)
        )
    }

    /// Whether the order has settled (it may still be refunded from
    /// `SUCCESS`).
    #[must_use]
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Paying)
    }
}
