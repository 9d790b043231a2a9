//! Per-tenant company profile (singleton document).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use workaccess_core::{time, TenantId};

/// Length of the free evaluation period granted at registration.
pub const TRIAL_DAYS: i64 = 14;

/// Subscription lifecycle states.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Active,
    PastDue,
    Canceled,
}

/// Expiry-digest preferences stored on the profile.
///
/// `digest_email` is the legacy direct recipient; `digest_recipient_contact_id`
/// is the preferred contact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSettings {
    pub expirations_days: u32,
    pub digest_email: String,
    pub digest_recipient_contact_id: String,
    /// `YYYY-MM-DD` of the last digest run; empty when never sent.
    pub last_digest_sent_on: String,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            expirations_days: 30,
            digest_email: String::new(),
            digest_recipient_contact_id: String::new(),
            last_digest_sent_on: String::new(),
        }
    }
}

impl AlertSettings {
    /// Clamp a requested digest horizon to a sane range.
    pub fn clamp_expirations_days(raw: i64) -> u32 {
        raw.clamp(1, 365) as u32
    }
}

/// The tenant profile document (entity name `company`).
///
/// Unknown fields in stored documents are dropped, missing fields are
/// backfilled with defaults, so older documents migrate in place on read.
/// Date fields are persisted timestamp strings; empty means unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    pub company_id: String,
    pub name: String,
    pub ico: String,
    pub dic: String,
    pub address: String,
    pub city: String,
    pub zip: String,
    pub country: String,
    pub email: String,
    pub phone: String,
    pub alerts: AlertSettings,

    pub trial_start: String,
    pub trial_end: String,

    pub subscription_status: SubscriptionStatus,
    pub plan: String,
    pub payment_provider: String,
    pub subscription_start: String,
    pub subscription_end: String,

    pub created_at: String,
    pub updated_at: String,
}

impl CompanyProfile {
    /// Fresh profile for a tenant that has never been seen before.
    pub fn new(company_id: &TenantId) -> Self {
        let now = time::now_iso();
        Self {
            company_id: company_id.as_str().to_string(),
            country: "CZ".to_string(),
            plan: "free".to_string(),
            created_at: now.clone(),
            updated_at: now,
            ..Default::default()
        }
    }

    /// Open the evaluation window starting at `now`.
    pub fn start_trial(&mut self, now: DateTime<Utc>) {
        self.trial_start = time::to_iso(now);
        self.trial_end = time::to_iso(now + Duration::days(TRIAL_DAYS));
        self.touch(now);
    }

    /// Apply a subscription activation.
    pub fn activate_subscription(
        &mut self,
        plan: String,
        provider: String,
        now: DateTime<Utc>,
        end: DateTime<Utc>,
    ) {
        self.subscription_status = SubscriptionStatus::Active;
        self.plan = plan;
        self.payment_provider = provider;
        self.subscription_start = time::to_iso(now);
        self.subscription_end = time::to_iso(end);
        self.touch(now);
    }

    /// Cancel the subscription effective immediately.
    pub fn cancel_subscription(&mut self, now: DateTime<Utc>) {
        self.subscription_status = SubscriptionStatus::Canceled;
        self.subscription_end = time::to_iso(now);
        self.touch(now);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = time::to_iso(now);
    }
}
