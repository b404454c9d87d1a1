//! Read-only catalogue queries.
//!
//! Filters are optional. The query builders below append them in a fixed
//! order and omit absent or empty values, so an unset filter never reaches
//! the server as `key=`.

use query_encoding::QueryParams;

use crate::domain::models::{Court, EntityId, FlashSession, Reservation, ReservationStatus, TimeSlot};
use crate::domain::{ApiError, ApiGateway};

/// Filters for [`BrowseApi::sessions`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionQuery {
    pub flash_time_lower_bound: Option<String>,
    pub flash_time_upper_bound: Option<String>,
    pub begin_time_lower_bound: Option<String>,
    pub begin_time_upper_bound: Option<String>,
    pub end_time_lower_bound: Option<String>,
    pub end_time_upper_bound: Option<String>,
    pub slot_interval_lower_bound: Option<i64>,
    pub slot_interval_upper_bound: Option<i64>,
}

impl SessionQuery {
    /// Encoded query parameters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .optional("flashTimeLowerBound", self.flash_time_lower_bound.as_deref())
            .optional("flashTimeUpperBound", self.flash_time_upper_bound.as_deref())
            .optional("beginTimeLowerBound", self.begin_time_lower_bound.as_deref())
            .optional("beginTimeUpperBound", self.begin_time_upper_bound.as_deref())
            .optional("endTimeLowerBound", self.end_time_lower_bound.as_deref())
            .optional("endTimeUpperBound", self.end_time_upper_bound.as_deref())
            .optional("slotIntervalLowerBound", self.slot_interval_lower_bound)
            .optional("slotIntervalUpperBound", self.slot_interval_upper_bound)
    }
}

/// Filters for [`BrowseApi::slots`]. The session is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotQuery {
    pub session_id: EntityId,
    pub date_lower_bound: Option<String>,
    pub date_upper_bound: Option<String>,
    /// Restrict to these courts; empty means all.
    pub court_ids: Vec<EntityId>,
    pub start_time_lower_bound: Option<String>,
    pub start_time_upper_bound: Option<String>,
    pub end_time_lower_bound: Option<String>,
    pub end_time_upper_bound: Option<String>,
}

impl SlotQuery {
    /// Slots of one session, unfiltered.
    #[must_use]
    pub fn for_session(session_id: EntityId) -> Self {
        Self {
            session_id,
            ..Self::default()
        }
    }

    /// Encoded query parameters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .optional("sessionId", Some(self.session_id))
            .optional("dateLowerBound", self.date_lower_bound.as_deref())
            .optional("dateUpperBound", self.date_upper_bound.as_deref())
            .repeated("courtIds", &self.court_ids)
            .optional("startTimeLowerBound", self.start_time_lower_bound.as_deref())
            .optional("startTimeUpperBound", self.start_time_upper_bound.as_deref())
            .optional("endTimeLowerBound", self.end_time_lower_bound.as_deref())
            .optional("endTimeUpperBound", self.end_time_upper_bound.as_deref())
    }
}

/// Filters for [`BrowseApi::reservations`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationQuery {
    pub session_id: Option<EntityId>,
    pub slot_id: Option<EntityId>,
    /// Restrict to these statuses; empty means all.
    pub statuses: Vec<ReservationStatus>,
    pub date_lower_bound: Option<String>,
    pub date_upper_bound: Option<String>,
}

impl ReservationQuery {
    /// Encoded query parameters.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .optional("sessionId", self.session_id)
            .optional("slotId", self.slot_id)
            .repeated("statuses", &self.statuses)
            .optional("dateLowerBound", self.date_lower_bound.as_deref())
            .optional("dateUpperBound", self.date_upper_bound.as_deref())
    }
}

/// `/browse` operations.
pub struct BrowseApi<'a> {
    gateway: &'a ApiGateway,
}

impl<'a> BrowseApi<'a> {
    pub(crate) fn new(gateway: &'a ApiGateway) -> Self {
        Self { gateway }
    }

    /// Sessions matching `query`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn sessions(&self, query: &SessionQuery) -> Result<Vec<FlashSession>, ApiError> {
        self.gateway
            .get(&query.to_query().append_to("/browse/session"))
            .await
    }

    /// One session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn session(&self, id: EntityId) -> Result<FlashSession, ApiError> {
        self.gateway.get(&format!("/browse/session/{id}")).await
    }

    /// Whether booking is currently open for a session.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn is_session_open(&self, session_id: EntityId) -> Result<bool, ApiError> {
        self.gateway
            .get(&format!("/browse/open/{session_id}"))
            .await
    }

    /// Courts, optionally filtered by a name fragment.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn courts(&self, name_like: Option<&str>) -> Result<Vec<Court>, ApiError> {
        let path = QueryParams::new()
            .optional("courtNameLike", name_like)
            .append_to("/browse/court");
        self.gateway.get(&path).await
    }

    /// One court.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn court(&self, id: EntityId) -> Result<Court, ApiError> {
        self.gateway.get(&format!("/browse/court/{id}")).await
    }

    /// One slot.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn slot(&self, id: EntityId) -> Result<TimeSlot, ApiError> {
        self.gateway.get(&format!("/browse/slot/{id}")).await
    }

    /// Slots matching `query`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn slots(&self, query: &SlotQuery) -> Result<Vec<TimeSlot>, ApiError> {
        self.gateway
            .get(&query.to_query().append_to("/browse/slot"))
            .await
    }

    /// Reservations matching `query`.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] raised by the gateway.
    pub async fn reservations(
        &self,
        query: &ReservationQuery,
    ) -> Result<Vec<Reservation>, ApiError> {
        self.gateway
            .get(&query.to_query().append_to("/browse/reservation"))
            .await
    }
}
