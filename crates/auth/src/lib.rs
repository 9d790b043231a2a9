//! `workaccess-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it defines
//! what an identity *is* (role, claims, context) and which identity
//! strategies the process accepts, not how requests carry them.

pub mod claims;
pub mod context;
pub mod mode;
pub mod password;
pub mod roles;

pub use claims::{AccessClaims, TokenCodec, TokenError};
pub use context::AuthContext;
pub use mode::{AccessMode, AccessPolicy, Environment, PolicyError};
pub use password::{hash_password, verify_password, PasswordError};
pub use roles::Role;
