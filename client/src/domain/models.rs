//! Wire records exchanged with the reservation service.
//!
//! Field names follow the server's camelCase JSON. Timestamps, dates and
//! amounts stay as the server-formatted strings; the client never does
//! arithmetic on them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use zeroize::Zeroizing;

/// Identifier type used by every server entity.
pub type EntityId = i64;

macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Wire spelling.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $( $wire => Ok(Self::$variant), )+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

/// Raised when parsing an unknown enum spelling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

wire_enum! {
    /// Account tier stored on the server.
    pub enum UserRole {
        /// Student account.
        User => "USER",
        /// Administrator.
        Admin => "ADMIN",
    }
}

wire_enum! {
    /// Lifecycle of a granted reservation.
    pub enum ReservationStatus {
        /// Created, not yet awaiting payment.
        Pending => "PENDING",
        /// Waiting for the payment to settle.
        PendingPayment => "PENDING_PAYMENT",
        /// Paid and final.
        Confirmed => "CONFIRMED",
        /// Cancelled or expired.
        Cancelled => "CANCELLED",
    }
}

wire_enum! {
    /// Outcome of an asynchronous reservation attempt.
    pub enum ReserveResultStatus {
        /// Not settled yet.
        Pending => "PENDING",
        /// A reservation was granted.
        Success => "SUCCESS",
        /// The attempt was rejected.
        Failed => "FAILED",
    }
}

wire_enum! {
    /// Payment order state.
    pub enum PayOrderStatus {
        /// Created and awaiting the payer.
        Paying => "PAYING",
        /// Paid.
        Success => "SUCCESS",
        /// Refunded after payment.
        Refunded => "REFUNDED",
        /// Closed without payment.
        Closed => "CLOSED",
        /// Payment failed.
        Failed => "FAILED",
    }
}

wire_enum! {
    /// Payment provider.
    pub enum PayChannel {
        /// WeChat Pay.
        Wechat => "WECHAT",
    }
}

wire_enum! {
    /// Keys of the server's system configuration.
    pub enum ConfigKey {
        /// Minutes before opening when caches are warmed.
        WarmupMinute => "WARMUP_MINUTE",
        /// Minutes a reservation may stay unpaid.
        PayTimeoutMinute => "PAY_TIMEOUT_MINUTE",
        /// Price per slot.
        PayAmount => "PAY_AMOUNT",
        /// Time of day when slots are generated.
        GenerateTimeSlotTime => "GENERATE_TIME_SLOT_TIME",
        /// Number of courts.
        CourtCount => "COURT_COUNT",
        /// Court naming pattern.
        CourtNameFormat => "COURT_NAME_FORMAT",
    }
}

/// Secret string that is zeroed on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a plaintext password.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(Zeroizing::new(raw.into()))
    }

    /// Plaintext, for serialisation only.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Register/login body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Student number used as the login name.
    pub student_id: String,
    /// Plaintext password.
    pub password: Password,
}

impl Credentials {
    /// Pair a student number with a password.
    pub fn new(student_id: impl Into<String>, password: impl Into<Password>) -> Self {
        Self {
            student_id: student_id.into(),
            password: password.into(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsWire<'a> {
    student_id: &'a str,
    password: &'a str,
}

impl Serialize for Credentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CredentialsWire {
            student_id: &self.student_id,
            password: self.password.expose(),
        }
        .serialize(serializer)
    }
}

/// Self-service profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSelfUpdate {
    /// New student number.
    pub student_id: Option<String>,
    /// Current password, required by the server when changing it.
    pub old_password: Option<Password>,
    /// Replacement password.
    pub new_password: Option<Password>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserSelfUpdateWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    old_password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    new_password: Option<&'a str>,
}

impl Serialize for UserSelfUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        UserSelfUpdateWire {
            student_id: self.student_id.as_deref(),
            old_password: self.old_password.as_ref().map(Password::expose),
            new_password: self.new_password.as_ref().map(Password::expose),
        }
        .serialize(serializer)
    }
}

/// Administrator create/update body for an account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminUserUpdate {
    /// Student number.
    pub student_id: Option<String>,
    /// Password to set.
    pub password: Option<Password>,
    /// Account tier.
    pub user_role: Option<UserRole>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminUserUpdateWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    student_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_role: Option<UserRole>,
}

impl Serialize for AdminUserUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AdminUserUpdateWire {
            student_id: self.student_id.as_deref(),
            password: self.password.as_ref().map(Password::expose),
            user_role: self.user_role,
        }
        .serialize(serializer)
    }
}

/// Reservation attempt body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveRequest {
    /// Slot to reserve.
    pub slot_id: EntityId,
    /// Session the slot belongs to.
    pub session_id: EntityId,
}

/// Create/update body for a flash session. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashSessionDraft {
    /// When booking opens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash_time: Option<String>,
    /// First bookable date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_time: Option<String>,
    /// Last bookable date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Slot length in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_interval: Option<i64>,
}

/// One system configuration entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    /// Entry key.
    pub config_key: ConfigKey,
    /// Entry value as text.
    pub value: String,
}

/// Complete system configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    /// All entries.
    pub config_items: Vec<ConfigItem>,
}

impl SystemConfig {
    /// Value stored under `key`.
    #[must_use]
    pub fn value(&self, key: ConfigKey) -> Option<&str> {
        self.config_items
            .iter()
            .find(|item| item.config_key == key)
            .map(|item| item.value.as_str())
    }
}

/// Account as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: EntityId,
    pub student_id: String,
    pub create_time: String,
    pub update_time: String,
    pub user_role: UserRole,
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
}

/// Booking window during which slots are released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashSession {
    pub id: EntityId,
    pub flash_time: String,
    pub begin_time: String,
    pub end_time: String,
    pub slot_interval: i64,
    pub create_time: String,
    pub update_time: String,
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
}

/// Physical court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: EntityId,
    pub court_name: String,
    pub create_time: String,
    pub update_time: String,
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
}

/// Bookable unit of court time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: EntityId,
    pub slot_date: String,
    pub start_time: String,
    pub end_time: String,
    pub court_id: EntityId,
    pub session_id: EntityId,
    pub create_time: String,
    pub update_time: String,
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
}

/// Granted reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: EntityId,
    pub user_id: EntityId,
    pub slot_id: EntityId,
    pub trace_id: String,
    pub status: ReservationStatus,
    #[serde(default)]
    pub active_slot_id: Option<EntityId>,
    pub create_time: String,
    pub update_time: String,
    #[serde(deserialize_with = "flag")]
    pub is_active: bool,
}

/// Poll answer for a reservation trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveResult {
    /// Trace the answer refers to.
    pub trace_id: String,
    /// Settlement state.
    pub status: ReserveResultStatus,
    /// Granted reservation; set once `status` is `SUCCESS`.
    #[serde(default)]
    pub reservation_id: Option<EntityId>,
    /// Lifecycle of the granted reservation.
    #[serde(default)]
    pub reservation_status: Option<ReservationStatus>,
}

/// Parameters for launching a WeChat payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WechatPayCreate {
    pub reservation_id: EntityId,
    pub out_trade_no: String,
    pub prepay_id: String,
    pub nonce_str: String,
    pub time_stamp: String,
    pub package_value: String,
    pub sign_type: String,
    pub pay_sign: String,
}

/// Payment order fields; present only once an order exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    /// Merchant order number.
    pub out_trade_no: String,
    /// Order state.
    pub pay_status: PayOrderStatus,
    /// Amount as formatted by the server.
    pub amount: String,
    /// When the unpaid order expires.
    pub expire_time: String,
}

/// Payment view of a reservation.
///
/// ## Invariants
/// - `out_trade_no`, `pay_status`, `amount` and `expire_time` are either all
///   present on the wire (`payment` is `Some`) or all absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PayOrderResultDto", into = "PayOrderResultDto")]
pub struct PayOrderResult {
    /// Reservation the order belongs to.
    pub reservation_id: EntityId,
    /// Reservation lifecycle; always present.
    pub reservation_status: ReservationStatus,
    /// Payment provider.
    pub pay_channel: Option<PayChannel>,
    /// Last modification time of the order.
    pub update_time: Option<String>,
    /// Order details, once an order exists.
    pub payment: Option<PaymentDetails>,
}

/// Raised when a pay result mixes present and absent payment fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payment fields must be all present or all absent")]
pub struct PartialPaymentError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PayOrderResultDto {
    reservation_id: EntityId,
    #[serde(default)]
    out_trade_no: Option<String>,
    #[serde(default)]
    pay_channel: Option<PayChannel>,
    #[serde(default)]
    pay_status: Option<PayOrderStatus>,
    reservation_status: ReservationStatus,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    expire_time: Option<String>,
    #[serde(default)]
    update_time: Option<String>,
}

impl TryFrom<PayOrderResultDto> for PayOrderResult {
    type Error = PartialPaymentError;

    fn try_from(value: PayOrderResultDto) -> Result<Self, Self::Error> {
        let payment = match (
            value.out_trade_no,
            value.pay_status,
            value.amount,
            value.expire_time,
        ) {
            (Some(out_trade_no), Some(pay_status), Some(amount), Some(expire_time)) => {
                Some(PaymentDetails {
                    out_trade_no,
                    pay_status,
                    amount,
                    expire_time,
                })
            }
            (None, None, None, None) => None,
            _ => return Err(PartialPaymentError),
        };
        Ok(Self {
            reservation_id: value.reservation_id,
            reservation_status: value.reservation_status,
            pay_channel: value.pay_channel,
            update_time: value.update_time,
            payment,
        })
    }
}

impl From<PayOrderResult> for PayOrderResultDto {
    fn from(value: PayOrderResult) -> Self {
        let PayOrderResult {
            reservation_id,
            reservation_status,
            pay_channel,
            update_time,
            payment,
        } = value;
        let (out_trade_no, pay_status, amount, expire_time) = match payment {
            Some(details) => (
                Some(details.out_trade_no),
                Some(details.pay_status),
                Some(details.amount),
                Some(details.expire_time),
            ),
            None => (None, None, None, None),
        };
        Self {
            reservation_id,
            out_trade_no,
            pay_channel,
            pay_status,
            reservation_status,
            amount,
            expire_time,
            update_time,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagRepr {
    Bool(bool),
    Int(i64),
}

// Some endpoints send `isActive` as 0/1 rather than a boolean.
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match FlagRepr::deserialize(deserializer)? {
        FlagRepr::Bool(value) => value,
        FlagRepr::Int(value) => value != 0,
    })
}
