//! Migration to create the organizations table.
//!
//! This migration creates the authoritative organization directory with
//! unique indexes on the organization name and admin email. The per-tenant
//! collections are created at runtime and are deliberately not part of the
//! migrated schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Organizations::OrganizationName)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Organizations::AdminEmail).text().not_null())
                    .col(ColumnDef::new(Organizations::Credential).text().not_null())
                    .col(
                        ColumnDef::new(Organizations::CollectionName)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_name")
                    .table(Organizations::Table)
                    .col(Organizations::OrganizationName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organizations_admin_email")
                    .table(Organizations::Table)
                    .col(Organizations::AdminEmail)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
    OrganizationName,
    AdminEmail,
    Credential,
    CollectionName,
    CreatedAt,
}
