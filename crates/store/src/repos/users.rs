//! Per-tenant user records.

use serde::{Deserialize, Serialize};

use workaccess_audit::make_id;
use workaccess_auth::Role;
use workaccess_core::{time, DomainError, TenantId};

use crate::entity::{map_collection, read_collection, EntityStore, StoreError};

pub const USERS_ENTITY: &str = "users";

/// Stored user record. `password_hash` never leaves the storage layer in
/// responses; use [`UserRecord::public`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_id: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Response-safe projection of a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_id: String,
}

impl UserRecord {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            company_id: self.company_id.clone(),
        }
    }
}

/// Fields for creating a user; the password is already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserRepo<S> {
    store: S,
}

impl<S: EntityStore> UserRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn find_by_email(
        &self,
        tenant: &TenantId,
        email: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let needle = normalize_email(email);
        if needle.is_empty() {
            return Ok(None);
        }
        let users: Vec<UserRecord> = read_collection(&self.store, tenant, USERS_ENTITY).await?;
        Ok(users.into_iter().find(|u| normalize_email(&u.email) == needle))
    }

    /// Create a user; e-mail is unique per tenant (conflict otherwise).
    pub async fn create(&self, tenant: &TenantId, new: NewUser) -> Result<UserRecord, StoreError> {
        let email = normalize_email(&new.email);
        if email.is_empty() || new.password_hash.is_empty() {
            return Err(DomainError::validation("email and password are required").into());
        }

        let now = time::now_iso();
        let user = UserRecord {
            id: make_id("usr"),
            email: email.clone(),
            name: new.name.trim().to_string(),
            role: new.role,
            company_id: tenant.as_str().to_string(),
            password_hash: new.password_hash,
            created_at: now.clone(),
            updated_at: now,
        };

        let stored = user.clone();
        self.store
            .update(
                tenant,
                USERS_ENTITY,
                map_collection::<UserRecord, _>(move |users| {
                    if users.iter().any(|u| normalize_email(&u.email) == email) {
                        return Err(DomainError::conflict("user already exists").into());
                    }
                    users.push(stored);
                    Ok(())
                }),
            )
            .await?;
        Ok(user)
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
