//! `workaccess-billing` — trial and subscription policy (pure domain).
//!
//! The gate decision itself is two date comparisons; everything here is
//! deterministic and free of I/O so the safety-critical placement logic can
//! be tested in isolation.

pub mod profile;
pub mod status;

pub use profile::{AlertSettings, CompanyProfile, SubscriptionStatus, TRIAL_DAYS};
pub use status::{is_locked, subscription_active, subscription_expired, trial_expired};
