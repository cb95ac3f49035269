//! # Organization Repository
//!
//! The authoritative tenant directory: one record per organization, with
//! uniqueness enforced on the organization name and admin email by database
//! indexes. Credentials are hashed by an explicit prepare-for-persistence
//! step inside `insert` and `update`; the directory exposes verification
//! only, never a way back to plaintext.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, ModelTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use crate::credentials;
use crate::error::OrgError;
use crate::models::organization::{
    ActiveModel as OrganizationActiveModel, Column, Entity as Organization,
    Model as OrganizationModel,
};

/// Data for inserting a new organization record.
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub organization_name: String,
    pub admin_email: String,
    /// Plaintext credential; hashed before persistence, never stored.
    pub password: String,
    pub collection_name: String,
}

/// Field changes for an existing organization record.
///
/// `None` fields are left untouched. A `password` change is hashed before
/// persistence, same as on insert.
#[derive(Debug, Clone, Default)]
pub struct OrganizationUpdate {
    pub organization_name: Option<String>,
    pub admin_email: Option<String>,
    pub password: Option<String>,
    pub collection_name: Option<String>,
}

/// Repository for organization directory operations.
pub struct OrganizationRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> OrganizationRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by its display name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<OrganizationModel>, OrgError> {
        let record = Organization::find()
            .filter(Column::OrganizationName.eq(name.trim()))
            .one(self.db)
            .await?;

        Ok(record)
    }

    /// Finds an organization by its admin email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<OrganizationModel>, OrgError> {
        let record = Organization::find()
            .filter(Column::AdminEmail.eq(email.trim().to_lowercase()))
            .one(self.db)
            .await?;

        Ok(record)
    }

    /// Inserts a new organization record.
    ///
    /// Normalizes the unique fields (name trimmed, email lowercased and
    /// trimmed) and hashes the credential before writing. A collision on
    /// either unique field surfaces as `Duplicate`.
    pub async fn insert(&self, new: NewOrganization) -> Result<OrganizationModel, OrgError> {
        let credential = credentials::hash_credential(&new.password)?;

        let record = OrganizationActiveModel {
            id: Set(Uuid::new_v4()),
            organization_name: Set(new.organization_name.trim().to_string()),
            admin_email: Set(new.admin_email.trim().to_lowercase()),
            credential: Set(credential),
            collection_name: Set(new.collection_name),
            created_at: Set(Utc::now().into()),
        };

        record
            .insert(self.db)
            .await
            .map_err(|e| OrgError::from_db(e, "Organization already exists"))
    }

    /// Applies field changes to an existing organization record.
    ///
    /// The same duplicate-key semantics as `insert` apply to changed unique
    /// fields.
    pub async fn update(
        &self,
        id: Uuid,
        changes: OrganizationUpdate,
    ) -> Result<OrganizationModel, OrgError> {
        let record = Organization::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| OrgError::not_found("Organization not found"))?;

        let mut active = record.into_active_model();

        if let Some(name) = changes.organization_name {
            active.organization_name = Set(name.trim().to_string());
        }
        if let Some(email) = changes.admin_email {
            active.admin_email = Set(email.trim().to_lowercase());
        }
        if let Some(password) = changes.password {
            active.credential = Set(credentials::hash_credential(&password)?);
        }
        if let Some(collection_name) = changes.collection_name {
            active.collection_name = Set(collection_name);
        }

        active
            .update(self.db)
            .await
            .map_err(|e| OrgError::from_db(e, "Organization already exists"))
    }

    /// Deletes an organization record.
    pub async fn delete(&self, id: Uuid) -> Result<(), OrgError> {
        let record = Organization::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or_else(|| OrgError::not_found("Organization not found"))?;

        record.delete(self.db).await?;

        Ok(())
    }

    /// Verifies a plaintext credential against a stored record.
    pub fn verify_credential(&self, record: &OrganizationModel, plaintext: &str) -> bool {
        credentials::verify_credential(plaintext, &record.credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectOptions, Database};

    async fn setup_test_db() -> DatabaseConnection {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1);
        let db = Database::connect(opt).await.expect("sqlite pool");
        Migrator::up(&db, None).await.expect("migrations");
        db
    }

    fn acme() -> NewOrganization {
        NewOrganization {
            organization_name: "Acme Corp".to_string(),
            admin_email: "Admin@Acme.example".to_string(),
            password: "hunter2hunter2".to_string(),
            collection_name: "org_acme_corp".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_normalizes_and_hashes() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        let record = repo.insert(acme()).await.unwrap();
        assert_eq!(record.organization_name, "Acme Corp");
        assert_eq!(record.admin_email, "admin@acme.example");
        assert_ne!(record.credential, "hunter2hunter2");
        assert!(record.credential.starts_with("$argon2id$"));
        assert!(repo.verify_credential(&record, "hunter2hunter2"));
        assert!(!repo.verify_credential(&record, "wrong"));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        repo.insert(acme()).await.unwrap();

        let mut second = acme();
        second.admin_email = "other@acme.example".to_string();
        let err = repo.insert(second).await.unwrap_err();
        assert!(matches!(err, OrgError::Duplicate(_)));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        repo.insert(acme()).await.unwrap();

        let mut second = acme();
        second.organization_name = "Other Corp".to_string();
        let err = repo.insert(second).await.unwrap_err();
        assert!(matches!(err, OrgError::Duplicate(_)));
    }

    #[tokio::test]
    async fn find_by_email_is_case_insensitive_on_input() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        repo.insert(acme()).await.unwrap();

        let found = repo.find_by_email("ADMIN@ACME.EXAMPLE").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn update_changes_only_requested_fields() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        let record = repo.insert(acme()).await.unwrap();
        let updated = repo
            .update(
                record.id,
                OrganizationUpdate {
                    organization_name: Some("Acme Labs".to_string()),
                    collection_name: Some("org_acme_labs".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.organization_name, "Acme Labs");
        assert_eq!(updated.collection_name, "org_acme_labs");
        assert_eq!(updated.admin_email, record.admin_email);
        assert_eq!(updated.credential, record.credential);
        assert_eq!(updated.created_at, record.created_at);
    }

    #[tokio::test]
    async fn update_rehashes_changed_password() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        let record = repo.insert(acme()).await.unwrap();
        let updated = repo
            .update(
                record.id,
                OrganizationUpdate {
                    password: Some("new-password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_ne!(updated.credential, record.credential);
        assert!(repo.verify_credential(&updated, "new-password"));
        assert!(!repo.verify_credential(&updated, "hunter2hunter2"));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let db = setup_test_db().await;
        let repo = OrganizationRepository::new(&db);

        let record = repo.insert(acme()).await.unwrap();
        repo.delete(record.id).await.unwrap();

        assert!(repo.find_by_name("Acme Corp").await.unwrap().is_none());

        let err = repo.delete(record.id).await.unwrap_err();
        assert!(matches!(err, OrgError::NotFound(_)));
    }
}
