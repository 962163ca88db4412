//! Core record types shared by every generator
//!
//! Records are plain serde structs; identity is carried by opaque
//! `RecordId` tokens so consumers join on foreign keys rather than on
//! positions. A subscription's missing end date is serialized as the
//! literal string `"N/A"` to match the exported dataset format.

use chrono::NaiveDate;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric plan identifier referencing the plan catalog
pub type PlanId = u32;

/// Opaque 8-character identity token.
///
/// Tokens are derived from the injected RNG rather than from ambient
/// entropy, so a seeded run reproduces every id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Draw a fresh token from the given RNG
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        RecordId(uuid.simple().to_string()[..8].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId(value.to_string())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a subscription period is paid for.
///
/// Free-plan periods always carry `NotApplicable`; paid periods draw from
/// the 60/30/10 credit-card/wallet/bank split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CreditCard,
    WalletTransfer,
    BankTransfer,
    NotApplicable,
}

impl PaymentMethod {
    /// Stable numeric code for tabular exports
    pub fn id(&self) -> u8 {
        match self {
            PaymentMethod::CreditCard => 1,
            PaymentMethod::WalletTransfer => 2,
            PaymentMethod::BankTransfer => 3,
            PaymentMethod::NotApplicable => 4,
        }
    }
}

/// Whether a period's end date has passed the run's reference date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Expired,
}

/// One synthesized user: the input row the lifecycle generator consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSeed {
    pub user_id: RecordId,
    pub plan_id: PlanId,
    pub signup_date: NaiveDate,
}

/// One subscription period.
///
/// Periods are immutable; renewals and plan changes always produce a new
/// record rather than mutating an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub subscription_id: RecordId,
    pub user_id: RecordId,
    pub plan_id: PlanId,
    pub start_date: NaiveDate,
    #[serde(with = "na_date")]
    pub end_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub status: SubscriptionStatus,
}

impl Subscription {
    /// Free-plan periods have no end date
    pub fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }
}

/// One dated usage event attributed to a subscription period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub usage_id: RecordId,
    pub user_id: RecordId,
    pub subscription_id: RecordId,
    pub usage_date: NaiveDate,
    pub actions_performed: u32,
    pub storage_used_mb: f64,
    pub api_calls: u64,
    pub active_minutes: u32,
}

/// Serde adapter encoding `None` end dates as the literal `"N/A"`
pub mod na_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const SENTINEL: &str = "N/A";
    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(SENTINEL),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw == SENTINEL {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&raw, FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}
