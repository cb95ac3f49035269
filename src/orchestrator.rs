//! # Organization Lifecycle Orchestrator
//!
//! Sequences the tenant directory and the collection store to implement
//! create, login, rename, and delete as tenant-level transitions. The two
//! stores fail independently and there is no cross-store transaction, so
//! each transition orders its steps toward the safer failure direction:
//!
//! - create: record first, collection second — a mid-failure leaves an
//!   orphan record, never an unowned collection;
//! - rename: collection first, record second — a mid-failure leaves the
//!   record pointing at the vanished old name, never at a name that does
//!   not exist yet;
//! - delete: collection first, record second — a mid-failure leaves a
//!   harmless orphan record, never an unowned collection.
//!
//! None of these windows are auto-healed; a reconciliation sweep is future
//! work.

use sea_orm::DatabaseConnection;

use crate::auth::{self, Claims};
use crate::collections::CollectionStore;
use crate::config::AppConfig;
use crate::error::OrgError;
use crate::models::organization::Model as OrganizationModel;
use crate::repositories::{NewOrganization, OrganizationRepository, OrganizationUpdate};
use crate::sanitize::{COLLECTION_PREFIX, sanitize};

/// Per-request orchestrator over the directory and the collection store.
pub struct OrgService<'a> {
    config: &'a AppConfig,
    db: &'a DatabaseConnection,
    collections: CollectionStore,
}

impl<'a> OrgService<'a> {
    pub fn new(config: &'a AppConfig, db: &'a DatabaseConnection) -> Self {
        Self {
            config,
            db,
            collections: CollectionStore::new(db.clone()),
        }
    }

    fn directory(&self) -> OrganizationRepository<'_> {
        OrganizationRepository::new(self.db)
    }

    /// Creates an organization and its physical collection.
    ///
    /// Rejects duplicates against both directory records and existing
    /// collections before touching either store. The seeded marker document
    /// makes a freshly provisioned collection observably non-empty.
    pub async fn create_org(
        &self,
        organization_name: &str,
        email: &str,
        password: &str,
    ) -> Result<OrganizationModel, OrgError> {
        let organization_name = organization_name.trim();
        require_non_empty(&[organization_name, email.trim(), password])?;

        let directory = self.directory();
        if directory.find_by_name(organization_name).await?.is_some() {
            return Err(OrgError::duplicate("Organization already exists"));
        }

        let collection_name = sanitize(organization_name);
        if collection_name == COLLECTION_PREFIX {
            return Err(OrgError::validation(
                "Organization name must contain at least one usable character",
            ));
        }

        // Distinct display names may sanitize to the same identifier; the
        // sanitizer does not detect that, this transition does.
        if self.collections.exists(&collection_name).await? {
            return Err(OrgError::duplicate("Organization already exists"));
        }

        let record = directory
            .insert(NewOrganization {
                organization_name: organization_name.to_string(),
                admin_email: email.to_string(),
                password: password.to_string(),
                collection_name: collection_name.clone(),
            })
            .await?;

        // From here on a failure leaves an orphan record; surfaced to the
        // caller as an error, not rolled back.
        let collection = match self.collections.create(&collection_name).await {
            Ok(collection) => collection,
            Err(e) => {
                tracing::error!(
                    org = %record.organization_name,
                    collection = %collection_name,
                    "collection creation failed after record insert, orphan record left behind"
                );
                return Err(e);
            }
        };

        collection
            .insert(serde_json::json!({
                "welcome": true,
                "created_at": chrono::Utc::now().timestamp_millis(),
            }))
            .await?;

        tracing::info!(
            org = %record.organization_name,
            collection = %record.collection_name,
            "organization created"
        );

        Ok(record)
    }

    /// Verifies admin credentials and issues signed claims.
    ///
    /// Unknown email and wrong password return the same generic result; the
    /// unknown-email path burns a dummy hash verification so neither the
    /// message nor the timing reveals whether the account exists.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, OrganizationModel), OrgError> {
        require_non_empty(&[email.trim(), password])?;

        let Some(record) = self.directory().find_by_email(email).await? else {
            crate::credentials::verify_dummy(password);
            return Err(OrgError::unauthorized("Invalid credentials"));
        };

        if !self.directory().verify_credential(&record, password) {
            return Err(OrgError::unauthorized("Invalid credentials"));
        }

        let token = auth::issue_claims(self.config, &record)?;

        tracing::info!(org = %record.organization_name, "admin login");

        Ok((token, record))
    }

    /// Looks up an organization by display name.
    pub async fn get_org(&self, organization_name: &str) -> Result<OrganizationModel, OrgError> {
        require_non_empty(&[organization_name.trim()])?;

        self.directory()
            .find_by_name(organization_name)
            .await?
            .ok_or_else(|| OrgError::not_found("Organization not found"))
    }

    /// Renames an organization and its collection; optionally updates the
    /// admin email and credential in the same transition.
    ///
    /// Requires ownership. The physical rename runs before the record
    /// update, so a mid-failure leaves the record pointing at the vanished
    /// old collection name.
    pub async fn rename_org(
        &self,
        claims: &Claims,
        organization_name: &str,
        new_organization_name: &str,
        email: &str,
        password: Option<&str>,
    ) -> Result<OrganizationModel, OrgError> {
        let organization_name = organization_name.trim();
        let new_organization_name = new_organization_name.trim();
        require_non_empty(&[organization_name, new_organization_name, email.trim()])?;

        let directory = self.directory();
        let record = directory
            .find_by_name(organization_name)
            .await?
            .ok_or_else(|| OrgError::not_found("Organization not found"))?;

        auth::ensure_owner(claims, &record)?;

        if new_organization_name == record.organization_name {
            return Err(OrgError::validation(
                "New organization name must be different",
            ));
        }

        if directory
            .find_by_name(new_organization_name)
            .await?
            .is_some()
        {
            return Err(OrgError::duplicate(
                "New organization name already exists",
            ));
        }

        let new_collection_name = sanitize(new_organization_name);
        if new_collection_name == COLLECTION_PREFIX {
            return Err(OrgError::validation(
                "Organization name must contain at least one usable character",
            ));
        }

        if new_collection_name != record.collection_name {
            // Collection rename has overwrite-target semantics, so collisions
            // with collections owned by other tenants must be caught here.
            if self.collections.exists(&new_collection_name).await? {
                return Err(OrgError::duplicate(
                    "New organization name already exists",
                ));
            }

            self.collections
                .rename(&record.collection_name, &new_collection_name)
                .await?;
        }

        let updated = directory
            .update(
                record.id,
                OrganizationUpdate {
                    organization_name: Some(new_organization_name.to_string()),
                    admin_email: Some(email.to_string()),
                    password: password.map(str::to_string),
                    collection_name: Some(new_collection_name.clone()),
                },
            )
            .await
            .inspect_err(|_| {
                tracing::error!(
                    org = %record.organization_name,
                    old_collection = %record.collection_name,
                    new_collection = %new_collection_name,
                    "record update failed after collection rename, record references vanished name"
                );
            })?;

        tracing::info!(
            from = %record.organization_name,
            to = %updated.organization_name,
            collection = %updated.collection_name,
            "organization renamed"
        );

        Ok(updated)
    }

    /// Deletes an organization and its collection.
    ///
    /// Requires ownership. Drops the collection first, tolerating absence,
    /// then removes the record.
    pub async fn delete_org(
        &self,
        claims: &Claims,
        organization_name: &str,
    ) -> Result<(), OrgError> {
        require_non_empty(&[organization_name.trim()])?;

        let directory = self.directory();
        let record = directory
            .find_by_name(organization_name)
            .await?
            .ok_or_else(|| OrgError::not_found("Organization not found"))?;

        auth::ensure_owner(claims, &record)?;

        let dropped = self.collections.drop(&record.collection_name).await?;
        if !dropped {
            tracing::warn!(
                org = %record.organization_name,
                collection = %record.collection_name,
                "collection already absent at delete"
            );
        }

        directory.delete(record.id).await?;

        tracing::info!(org = %record.organization_name, "organization deleted");

        Ok(())
    }
}

fn require_non_empty(fields: &[&str]) -> Result<(), OrgError> {
    if fields.iter().any(|f| f.is_empty()) {
        Err(OrgError::validation("Missing required fields"))
    } else {
        Ok(())
    }
}
