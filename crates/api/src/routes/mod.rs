//! HTTP routes, one file per surface area. Each router fn composes its own
//! role and trial gates at registration time.

pub mod audit;
pub mod auth;
pub mod billing;
pub mod company;
pub mod employees;
pub mod me;
pub mod outbox;
pub mod public;
pub mod system;

use workaccess_auth::Role;

/// Roles allowed to mutate business data.
pub const WRITE_ROLES: &[Role] = &[Role::Hr, Role::Manager];

/// Roles allowed to read the ledgers.
pub const LEDGER_READ_ROLES: &[Role] = &[Role::Hr, Role::Manager, Role::Security];
