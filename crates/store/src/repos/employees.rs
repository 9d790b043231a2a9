//! Employee records with nested trainings (collection per tenant).
//!
//! Every mutation runs as one locked read-modify-write cycle; before/after
//! snapshots handed back for auditing are taken inside that cycle.

use serde::{Deserialize, Serialize};

use workaccess_audit::make_id;
use workaccess_core::{time, DomainError, TenantId};

use crate::entity::{decode_collection, map_collection, read_collection, EntityStore, StoreError};

pub const EMPLOYEES_ENTITY: &str = "employees";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Training {
    pub id: String,
    pub name: String,
    pub valid_from: String,
    pub valid_to: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: String,
    pub position: String,
    pub email: String,
    pub trainings: Vec<Training>,
    pub created_at: String,
    pub updated_at: String,
}

/// Caller-supplied employee fields; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct EmployeeInput {
    pub name: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
}

/// Caller-supplied training fields (all required; validated by the caller).
#[derive(Debug, Clone, Default)]
pub struct TrainingInput {
    pub name: String,
    pub valid_from: String,
    pub valid_to: String,
}

#[derive(Debug, Clone)]
pub struct EmployeeRepo<S> {
    store: S,
}

impl<S: EntityStore> EmployeeRepo<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn list(&self, tenant: &TenantId) -> Result<Vec<EmployeeRecord>, StoreError> {
        read_collection(&self.store, tenant, EMPLOYEES_ENTITY).await
    }

    pub async fn get(
        &self,
        tenant: &TenantId,
        id: &str,
    ) -> Result<Option<EmployeeRecord>, StoreError> {
        Ok(self.list(tenant).await?.into_iter().find(|e| e.id == id))
    }

    pub async fn create(
        &self,
        tenant: &TenantId,
        input: EmployeeInput,
    ) -> Result<EmployeeRecord, StoreError> {
        let name = input.name.as_deref().map(str::trim).unwrap_or("").to_string();
        if name.is_empty() {
            return Err(DomainError::validation("missing field: name").into());
        }

        let now = time::now_iso();
        let employee = EmployeeRecord {
            id: make_id("emp"),
            name,
            position: clean(input.position),
            email: clean(input.email),
            trainings: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        };

        let stored = employee.clone();
        self.store
            .update(
                tenant,
                EMPLOYEES_ENTITY,
                map_collection::<EmployeeRecord, _>(move |items| {
                    items.push(stored);
                    Ok(())
                }),
            )
            .await?;
        Ok(employee)
    }

    /// Patch an employee; returns (before, after) snapshots.
    pub async fn update(
        &self,
        tenant: &TenantId,
        id: &str,
        input: EmployeeInput,
    ) -> Result<(EmployeeRecord, EmployeeRecord), StoreError> {
        let target = id.to_string();
        let outcome = self
            .store
            .update(
                tenant,
                EMPLOYEES_ENTITY,
                map_collection::<EmployeeRecord, _>(move |items| {
                    let Some(emp) = items.iter_mut().find(|e| e.id == target) else {
                        return Err(not_found());
                    };
                    if let Some(name) = input.name {
                        let name = name.trim().to_string();
                        if name.is_empty() {
                            return Err(DomainError::validation("missing field: name").into());
                        }
                        emp.name = name;
                    }
                    if let Some(position) = input.position {
                        emp.position = position.trim().to_string();
                    }
                    if let Some(email) = input.email {
                        emp.email = email.trim().to_string();
                    }
                    emp.updated_at = time::now_iso();
                    Ok(())
                }),
            )
            .await?;
        self.snapshots(outcome, id)
    }

    /// Delete an employee; returns the removed record.
    pub async fn delete(&self, tenant: &TenantId, id: &str) -> Result<EmployeeRecord, StoreError> {
        let target = id.to_string();
        let outcome = self
            .store
            .update(
                tenant,
                EMPLOYEES_ENTITY,
                map_collection::<EmployeeRecord, _>(move |items| {
                    let len_before = items.len();
                    items.retain(|e| e.id != target);
                    if items.len() == len_before {
                        return Err(not_found());
                    }
                    Ok(())
                }),
            )
            .await?;
        let before: Vec<EmployeeRecord> = decode_collection(outcome.before);
        before
            .into_iter()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found())
    }

    /// Append a training; returns the updated employee and the new training.
    pub async fn add_training(
        &self,
        tenant: &TenantId,
        employee_id: &str,
        input: TrainingInput,
    ) -> Result<(EmployeeRecord, Training), StoreError> {
        let now = time::now_iso();
        let training = Training {
            id: make_id("trn"),
            name: input.name,
            valid_from: input.valid_from,
            valid_to: input.valid_to,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        let target = employee_id.to_string();
        let stored = training.clone();
        let outcome = self
            .store
            .update(
                tenant,
                EMPLOYEES_ENTITY,
                map_collection::<EmployeeRecord, _>(move |items| {
                    let Some(emp) = items.iter_mut().find(|e| e.id == target) else {
                        return Err(not_found());
                    };
                    emp.trainings.push(stored);
                    emp.updated_at = now;
                    Ok(())
                }),
            )
            .await?;

        let after: Vec<EmployeeRecord> = decode_collection(Some(outcome.after));
        let employee = after
            .into_iter()
            .find(|e| e.id == employee_id)
            .ok_or_else(|| not_found())?;
        Ok((employee, training))
    }

    /// Patch a training; returns (before, after) of the training itself.
    pub async fn update_training(
        &self,
        tenant: &TenantId,
        employee_id: &str,
        training_id: &str,
        input: TrainingInput,
    ) -> Result<(Training, Training), StoreError> {
        let emp_target = employee_id.to_string();
        let trn_target = training_id.to_string();
        let outcome = self
            .store
            .update(
                tenant,
                EMPLOYEES_ENTITY,
                map_collection::<EmployeeRecord, _>(move |items| {
                    let Some(emp) = items.iter_mut().find(|e| e.id == emp_target) else {
                        return Err(not_found());
                    };
                    let Some(trn) = emp.trainings.iter_mut().find(|t| t.id == trn_target) else {
                        return Err(training_not_found());
                    };
                    trn.name = input.name;
                    trn.valid_from = input.valid_from;
                    trn.valid_to = input.valid_to;
                    trn.updated_at = time::now_iso();
                    emp.updated_at = trn.updated_at.clone();
                    Ok(())
                }),
            )
            .await?;

        let before = find_training(decode_collection(outcome.before), employee_id, training_id)
            .ok_or_else(training_not_found)?;
        let after = find_training(
            decode_collection(Some(outcome.after)),
            employee_id,
            training_id,
        )
        .ok_or_else(training_not_found)?;
        Ok((before, after))
    }

    /// Remove a training; returns the removed training.
    pub async fn delete_training(
        &self,
        tenant: &TenantId,
        employee_id: &str,
        training_id: &str,
    ) -> Result<Training, StoreError> {
        let emp_target = employee_id.to_string();
        let trn_target = training_id.to_string();
        let outcome = self
            .store
            .update(
                tenant,
                EMPLOYEES_ENTITY,
                map_collection::<EmployeeRecord, _>(move |items| {
                    let Some(emp) = items.iter_mut().find(|e| e.id == emp_target) else {
                        return Err(not_found());
                    };
                    let len_before = emp.trainings.len();
                    emp.trainings.retain(|t| t.id != trn_target);
                    if emp.trainings.len() == len_before {
                        return Err(training_not_found());
                    }
                    emp.updated_at = time::now_iso();
                    Ok(())
                }),
            )
            .await?;

        find_training(decode_collection(outcome.before), employee_id, training_id)
            .ok_or_else(training_not_found)
    }

    fn snapshots(
        &self,
        outcome: crate::entity::UpdateOutcome,
        id: &str,
    ) -> Result<(EmployeeRecord, EmployeeRecord), StoreError> {
        let before: Vec<EmployeeRecord> = decode_collection(outcome.before);
        let after: Vec<EmployeeRecord> = decode_collection(Some(outcome.after));
        let before = before.into_iter().find(|e| e.id == id).ok_or_else(not_found)?;
        let after = after.into_iter().find(|e| e.id == id).ok_or_else(not_found)?;
        Ok((before, after))
    }
}

fn clean(raw: Option<String>) -> String {
    raw.as_deref().map(str::trim).unwrap_or("").to_string()
}

fn not_found() -> StoreError {
    DomainError::not_found("employee not found").into()
}

fn training_not_found() -> StoreError {
    DomainError::not_found("training not found").into()
}

fn find_training(
    employees: Vec<EmployeeRecord>,
    employee_id: &str,
    training_id: &str,
) -> Option<Training> {
    employees
        .into_iter()
        .find(|e| e.id == employee_id)?
        .trainings
        .into_iter()
        .find(|t| t.id == training_id)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::InMemoryEntityStore;

    fn repo() -> EmployeeRepo<Arc<InMemoryEntityStore>> {
        EmployeeRepo::new(Arc::new(InMemoryEntityStore::new()))
    }

    fn tenant() -> TenantId {
        TenantId::parse("acme").unwrap()
    }

    fn named(name: &str) -> EmployeeInput {
        EmployeeInput {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn training_input(name: &str) -> TrainingInput {
        TrainingInput {
            name: name.to_string(),
            valid_from: "2026-01-01".to_string(),
            valid_to: "2027-01-01".to_string(),
        }
    }

    #[tokio::test]
    async fn create_list_get_round_trip() {
        let repo = repo();
        let created = repo.create(&tenant(), named("Jana")).await.unwrap();
        assert!(created.id.starts_with("emp_"));

        let listed = repo.list(&tenant()).await.unwrap();
        assert_eq!(listed.len(), 1);

        let got = repo.get(&tenant(), &created.id).await.unwrap().unwrap();
        assert_eq!(got.name, "Jana");
    }

    #[tokio::test]
    async fn create_requires_name() {
        let err = repo()
            .create(&tenant(), EmployeeInput::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::Validation(_))));
    }

    #[tokio::test]
    async fn update_patches_and_reports_snapshots() {
        let repo = repo();
        let created = repo.create(&tenant(), named("Jana")).await.unwrap();
        let (before, after) = repo
            .update(&tenant(), &created.id, named("Jana Nová"))
            .await
            .unwrap();
        assert_eq!(before.name, "Jana");
        assert_eq!(after.name, "Jana Nová");
    }

    #[tokio::test]
    async fn missing_employee_is_not_found() {
        let repo = repo();
        let err = repo
            .update(&tenant(), "emp_missing", named("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Domain(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let repo = repo();
        let created = repo.create(&tenant(), named("Jana")).await.unwrap();
        let removed = repo.delete(&tenant(), &created.id).await.unwrap();
        assert_eq!(removed.id, created.id);
        assert!(repo.list(&tenant()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn training_lifecycle() {
        let repo = repo();
        let emp = repo.create(&tenant(), named("Jana")).await.unwrap();

        let (updated, trn) = repo
            .add_training(&tenant(), &emp.id, training_input("BOZP"))
            .await
            .unwrap();
        assert_eq!(updated.trainings.len(), 1);
        assert!(trn.id.starts_with("trn_"));

        let (before, after) = repo
            .update_training(&tenant(), &emp.id, &trn.id, training_input("BOZP 2"))
            .await
            .unwrap();
        assert_eq!(before.name, "BOZP");
        assert_eq!(after.name, "BOZP 2");

        let removed = repo
            .delete_training(&tenant(), &emp.id, &trn.id)
            .await
            .unwrap();
        assert_eq!(removed.id, trn.id);
        let emp = repo.get(&tenant(), &emp.id).await.unwrap().unwrap();
        assert!(emp.trainings.is_empty());
    }

    #[tokio::test]
    async fn missing_training_is_its_own_not_found() {
        let repo = repo();
        let emp = repo.create(&tenant(), named("Jana")).await.unwrap();
        let err = repo
            .delete_training(&tenant(), &emp.id, "trn_missing")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Domain(DomainError::NotFound(ref m)) if m.contains("training")
        ));
    }
}
