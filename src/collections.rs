//! Collection lifecycle management.
//!
//! Create, rename, and drop operations against the dynamic per-tenant
//! collection namespace. Collections are dynamically named tables owned
//! exclusively by this module; the organization directory never touches them
//! directly. Every successful mutation emits a tracing event and a metrics
//! counter.
//!
//! There is no transaction spanning this namespace and the directory table.
//! Callers sequence the two stores and accept the documented inconsistency
//! windows.

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::error::OrgError;

/// Handle to a single tenant collection.
#[derive(Debug, Clone)]
pub struct Collection {
    db: DatabaseConnection,
    name: String,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a document into the collection.
    pub async fn insert(&self, doc: serde_json::Value) -> Result<(), OrgError> {
        let backend = self.db.get_database_backend();
        let payload = doc.to_string();

        let sql = match backend {
            DatabaseBackend::Postgres => {
                format!(r#"INSERT INTO "{}" (doc) VALUES ($1::jsonb)"#, self.name)
            }
            DatabaseBackend::Sqlite => {
                format!(r#"INSERT INTO "{}" (doc) VALUES (?)"#, self.name)
            }
            DatabaseBackend::MySql => {
                format!("INSERT INTO `{}` (doc) VALUES (CAST(? AS JSON))", self.name)
            }
        };

        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                sql,
                [payload.into()],
            ))
            .await?;

        Ok(())
    }
}

/// Manager for the dynamic collection namespace.
#[derive(Debug, Clone)]
pub struct CollectionStore {
    db: DatabaseConnection,
}

impl CollectionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns whether a collection with the given name exists.
    pub async fn exists(&self, name: &str) -> Result<bool, OrgError> {
        ensure_identifier(name)?;
        let backend = self.db.get_database_backend();

        match backend {
            DatabaseBackend::Postgres => {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT to_regclass($1) IS NOT NULL AS present",
                    [format!("public.{name}").into()],
                );
                let row = self.db.query_one(stmt).await?;
                Ok(row
                    .and_then(|r| r.try_get::<bool>("", "present").ok())
                    .unwrap_or(false))
            }
            DatabaseBackend::Sqlite => {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
                    [name.into()],
                );
                Ok(self.db.query_one(stmt).await?.is_some())
            }
            DatabaseBackend::MySql => {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT table_name FROM information_schema.tables \
                     WHERE table_schema = DATABASE() AND table_name = ?",
                    [name.into()],
                );
                Ok(self.db.query_one(stmt).await?.is_some())
            }
        }
    }

    /// Creates a collection, returning a handle to it.
    ///
    /// A no-op success when the collection already exists.
    pub async fn create(&self, name: &str) -> Result<Collection, OrgError> {
        ensure_identifier(name)?;

        if self.exists(name).await? {
            tracing::debug!(collection = name, "collection already exists");
            return Ok(Collection {
                db: self.db.clone(),
                name: name.to_string(),
            });
        }

        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::Postgres => format!(
                r#"CREATE TABLE IF NOT EXISTS "{name}" (
                    id BIGSERIAL PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"#
            ),
            DatabaseBackend::Sqlite => format!(
                r#"CREATE TABLE IF NOT EXISTS "{name}" (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    doc TEXT NOT NULL,
                    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
                )"#
            ),
            DatabaseBackend::MySql => format!(
                "CREATE TABLE IF NOT EXISTS `{name}` (
                    id BIGINT AUTO_INCREMENT PRIMARY KEY,
                    doc JSON NOT NULL,
                    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
                )"
            ),
        };

        self.db.execute_unprepared(&sql).await?;

        tracing::info!(collection = name, "collection created");
        metrics::counter!("orgstore_collections_created_total").increment(1);

        Ok(Collection {
            db: self.db.clone(),
            name: name.to_string(),
        })
    }

    /// Drops a collection.
    ///
    /// Returns `true` when the collection existed and was dropped, `false`
    /// when it was already absent. Never errors on an absent target.
    pub async fn drop(&self, name: &str) -> Result<bool, OrgError> {
        ensure_identifier(name)?;

        if !self.exists(name).await? {
            return Ok(false);
        }

        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::MySql => format!("DROP TABLE `{name}`"),
            _ => format!(r#"DROP TABLE "{name}""#),
        };

        self.db.execute_unprepared(&sql).await?;

        tracing::info!(collection = name, "collection dropped");
        metrics::counter!("orgstore_collections_dropped_total").increment(1);

        Ok(true)
    }

    /// Renames a collection with overwrite-target semantics.
    ///
    /// Fails with `NotFound` when the source is absent. When the target
    /// already exists it is dropped first; callers pre-check uniqueness
    /// against the directory to avoid unintended overwrites.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<(), OrgError> {
        ensure_identifier(old_name)?;
        ensure_identifier(new_name)?;

        if !self.exists(old_name).await? {
            return Err(OrgError::not_found(format!(
                "Source collection not found: {old_name}"
            )));
        }

        if self.exists(new_name).await? {
            tracing::warn!(
                collection = new_name,
                "rename target exists, dropping before rename"
            );
            self.drop(new_name).await?;
        }

        let backend = self.db.get_database_backend();
        let sql = match backend {
            DatabaseBackend::MySql => format!("RENAME TABLE `{old_name}` TO `{new_name}`"),
            _ => format!(r#"ALTER TABLE "{old_name}" RENAME TO "{new_name}""#),
        };

        self.db.execute_unprepared(&sql).await?;

        tracing::info!(from = old_name, to = new_name, "collection renamed");
        metrics::counter!("orgstore_collections_renamed_total").increment(1);

        Ok(())
    }
}

/// Rejects names that are not safe in an identifier position.
///
/// Derived names come out of `sanitize` and always pass; this guards the
/// DDL interpolation against any other caller.
fn ensure_identifier(name: &str) -> Result<(), OrgError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && name.chars().next().is_some_and(|c| c.is_ascii_lowercase())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(OrgError::validation(format!(
            "Invalid collection identifier: {name}"
        )))
    }
}
