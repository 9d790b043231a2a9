//! Gate decisions over a company profile.
//!
//! All functions are pure in `(profile, now)`. Unparseable or unset dates
//! never block a tenant: an unset trial means "no trial configured yet" and
//! an unset subscription end means the subscription does not cover anything.

use chrono::{DateTime, Utc};

use workaccess_core::time;

use crate::profile::{CompanyProfile, SubscriptionStatus};

/// True when `iso` holds a parseable instant strictly before `now`.
fn expired(iso: &str, now: DateTime<Utc>) -> bool {
    match time::parse_date_like(iso) {
        Some(t) => t < now,
        None => false,
    }
}

/// An active subscription must have a concrete end date in the future.
pub fn subscription_active(profile: &CompanyProfile, now: DateTime<Utc>) -> bool {
    if profile.subscription_status != SubscriptionStatus::Active {
        return false;
    }
    if profile.subscription_end.trim().is_empty() {
        return false;
    }
    !expired(&profile.subscription_end, now)
}

pub fn subscription_expired(profile: &CompanyProfile, now: DateTime<Utc>) -> bool {
    expired(&profile.subscription_end, now)
}

/// True once a configured trial window has lapsed.
pub fn trial_expired(profile: &CompanyProfile, now: DateTime<Utc>) -> bool {
    expired(&profile.trial_end, now)
}

/// The subscription/trial gate decision: deny only when the trial has lapsed
/// and no active subscription covers the request.
pub fn is_locked(profile: &CompanyProfile, now: DateTime<Utc>) -> bool {
    trial_expired(profile, now) && !subscription_active(profile, now)
}
