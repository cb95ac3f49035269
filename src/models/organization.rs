//! Organization entity model
//!
//! This module contains the SeaORM entity model for the organizations table,
//! the authoritative directory record for each tenant. The `credential`
//! column holds an Argon2id hash; plaintext never reaches this model.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Organization directory record, one per tenant.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "organizations")]
pub struct Model {
    /// Unique identifier for the organization (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-facing organization name, globally unique, stored trimmed
    #[sea_orm(unique)]
    pub organization_name: String,

    /// Admin login email, globally unique, stored lowercased and trimmed
    #[sea_orm(unique)]
    pub admin_email: String,

    /// Argon2id hash of the admin credential
    pub credential: String,

    /// Identifier of the physical collection owned by this organization
    pub collection_name: String,

    /// Timestamp when the organization was created, immutable
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
