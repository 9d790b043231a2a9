//! Typed repositories over the entity store, one per persisted entity.

pub mod company;
pub mod employees;
pub mod ledgers;
pub mod users;
