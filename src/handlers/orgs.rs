//! # Organization API Handlers
//!
//! HTTP endpoints for the organization lifecycle: create, login, lookup,
//! rename/update, and delete. Handlers validate field presence, hand off to
//! the orchestrator, and shape the uniform envelope; all sequencing and
//! authorization decisions live in the orchestrator.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::ClaimsExtension;
use crate::error::OrgError;
use crate::handlers::Envelope;
use crate::orchestrator::OrgService;
use crate::server::AppState;

/// Request payload for creating an organization
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrgRequest {
    /// Human-facing organization name (unique)
    #[schema(example = "Acme Corp")]
    pub organization_name: Option<String>,
    /// Admin login email (unique)
    #[schema(example = "admin@acme.example")]
    pub email: Option<String>,
    /// Admin password, hashed before persistence
    pub password: Option<String>,
}

/// Organization name and derived collection identifier
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrgSummary {
    #[schema(example = "Acme Corp")]
    pub org_name: String,
    #[schema(example = "org_acme_corp")]
    pub collection_name: String,
}

/// Request payload for admin login
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin@acme.example")]
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response payload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginData {
    /// Signed bearer token carrying the tenant's identity claims
    pub token: String,
    #[schema(example = "Acme Corp")]
    pub org_name: String,
}

/// Query parameters for organization lookup
#[derive(Debug, Deserialize, IntoParams)]
pub struct GetOrgQuery {
    /// Organization name to look up
    pub organization_name: Option<String>,
}

/// Full organization info returned by lookup
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrgInfo {
    #[schema(example = "Acme Corp")]
    pub organization_name: String,
    #[schema(example = "org_acme_corp")]
    pub collection_name: String,
    #[schema(example = "admin@acme.example")]
    pub admin_email: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

/// Request payload for renaming/updating an organization
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrgRequest {
    /// Current organization name
    pub organization_name: Option<String>,
    /// New organization name, must differ and be unused
    pub new_organization_name: Option<String>,
    /// Admin email to set
    pub email: Option<String>,
    /// Optional new password; rotated when present
    pub password: Option<String>,
}

/// Request payload for deleting an organization
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteOrgRequest {
    pub organization_name: Option<String>,
}

fn required(field: &Option<String>, message: &str) -> Result<String, OrgError> {
    match field.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(OrgError::validation(message)),
    }
}

/// Create an organization and provision its collection
#[utoipa::path(
    post,
    path = "/org/create",
    request_body = CreateOrgRequest,
    responses(
        (status = 201, description = "Organization created", body = Envelope<OrgSummary>),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "Organization already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "org"
)]
pub async fn create_org(
    State(state): State<AppState>,
    Json(request): Json<CreateOrgRequest>,
) -> Result<(StatusCode, Json<Envelope<OrgSummary>>), OrgError> {
    let organization_name = required(&request.organization_name, "Missing required fields")?;
    let email = required(&request.email, "Missing required fields")?;
    let password = required(&request.password, "Missing required fields")?;

    let service = OrgService::new(&state.config, &state.db);
    let record = service
        .create_org(&organization_name, &email, &password)
        .await?;

    let envelope = Envelope::data(OrgSummary {
        org_name: record.organization_name,
        collection_name: record.collection_name,
    })
    .with_message("Organization created");

    Ok((StatusCode::CREATED, Json(envelope)))
}

/// Verify admin credentials and issue a bearer token
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = Envelope<LoginData>),
        (status = 400, description = "Missing email or password"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "admin"
)]
pub async fn login_admin(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginData>>, OrgError> {
    let email = required(&request.email, "Missing email or password")?;
    let password = required(&request.password, "Missing email or password")?;

    let service = OrgService::new(&state.config, &state.db);
    let (token, record) = service.login(&email, &password).await?;

    Ok(Json(Envelope::data(LoginData {
        token,
        org_name: record.organization_name,
    })))
}

/// Look up an organization by name
#[utoipa::path(
    get,
    path = "/org/get",
    params(GetOrgQuery),
    responses(
        (status = 200, description = "Organization found", body = Envelope<OrgInfo>),
        (status = 400, description = "Missing organization_name"),
        (status = 404, description = "Organization not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "org"
)]
pub async fn get_org(
    State(state): State<AppState>,
    Query(query): Query<GetOrgQuery>,
) -> Result<Json<Envelope<OrgInfo>>, OrgError> {
    let organization_name = required(&query.organization_name, "Missing organization_name")?;

    let service = OrgService::new(&state.config, &state.db);
    let record = service.get_org(&organization_name).await?;

    Ok(Json(Envelope::data(OrgInfo {
        organization_name: record.organization_name,
        collection_name: record.collection_name,
        admin_email: record.admin_email,
        created_at: record.created_at.to_rfc3339(),
    })))
}

/// Rename an organization, moving its collection
#[utoipa::path(
    put,
    path = "/org/update",
    security(("bearer_auth" = [])),
    request_body = UpdateOrgRequest,
    responses(
        (status = 200, description = "Organization updated", body = Envelope<OrgSummary>),
        (status = 400, description = "Missing fields or same name"),
        (status = 401, description = "Missing/invalid token or not the owner"),
        (status = 404, description = "Organization not found"),
        (status = 409, description = "New name already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "org"
)]
pub async fn update_org(
    State(state): State<AppState>,
    ClaimsExtension(claims): ClaimsExtension,
    Json(request): Json<UpdateOrgRequest>,
) -> Result<Json<Envelope<OrgSummary>>, OrgError> {
    let organization_name = required(&request.organization_name, "Missing required fields")?;
    let new_organization_name =
        required(&request.new_organization_name, "Missing required fields")?;
    let email = required(&request.email, "Missing required fields")?;

    let service = OrgService::new(&state.config, &state.db);
    let record = service
        .rename_org(
            &claims,
            &organization_name,
            &new_organization_name,
            &email,
            request.password.as_deref().filter(|p| !p.is_empty()),
        )
        .await?;

    let envelope = Envelope::data(OrgSummary {
        org_name: record.organization_name,
        collection_name: record.collection_name,
    })
    .with_message("Organization updated");

    Ok(Json(envelope))
}

/// Delete an organization and drop its collection
#[utoipa::path(
    delete,
    path = "/org/delete",
    security(("bearer_auth" = [])),
    request_body = DeleteOrgRequest,
    responses(
        (status = 200, description = "Organization deleted"),
        (status = 400, description = "Missing organization_name"),
        (status = 401, description = "Missing/invalid token or not the owner"),
        (status = 404, description = "Organization not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "org"
)]
pub async fn delete_org(
    State(state): State<AppState>,
    ClaimsExtension(claims): ClaimsExtension,
    Json(request): Json<DeleteOrgRequest>,
) -> Result<Json<Envelope<()>>, OrgError> {
    let organization_name = required(&request.organization_name, "Missing organization_name")?;

    let service = OrgService::new(&state.config, &state.db);
    service.delete_org(&claims, &organization_name).await?;

    Ok(Json(Envelope::message("Organization deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(&None, "missing").is_err());
        assert!(required(&Some(String::new()), "missing").is_err());
        assert!(required(&Some("   ".to_string()), "missing").is_err());
    }

    #[test]
    fn required_trims_present_values() {
        let value = required(&Some("  Acme Corp ".to_string()), "missing").unwrap();
        assert_eq!(value, "Acme Corp");
    }
}
