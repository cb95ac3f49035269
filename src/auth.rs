//! # Authentication and Authorization
//!
//! Signed-claims issuance and the ownership gate for protected endpoints.
//!
//! Claims are produced once, at successful login, by signing the tenant's
//! identity with the server-held secret. The gate verifies signature and
//! expiry only and compares the embedded tenant id against the target
//! record; it does not re-check the directory, so claims are a snapshot and
//! remain valid until expiry even if the tenant was renamed in the meantime.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::OrgError;
use crate::models::organization::Model as OrganizationModel;
use crate::server::AppState;

/// Identity claims embedded in a login token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Tenant identifier, the field the ownership gate compares.
    pub org_id: Uuid,
    pub org_name: String,
    pub collection_name: String,
    pub email: String,
    /// Issued-at, seconds since epoch.
    pub iat: u64,
    /// Expiry, seconds since epoch; enforced on decode.
    pub exp: u64,
}

/// Extractor for decoded claims placed in request extensions by the
/// authentication middleware.
#[derive(Debug, Clone)]
pub struct ClaimsExtension(pub Claims);

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

/// Issues signed claims for a tenant, valid for the configured TTL.
pub fn issue_claims(config: &AppConfig, org: &OrganizationModel) -> Result<String, OrgError> {
    let now = Utc::now();
    let expiry = now + Duration::hours(config.token_ttl_hours as i64);

    let claims = Claims {
        org_id: org.id,
        org_name: org.organization_name.clone(),
        collection_name: org.collection_name.clone(),
        email: org.admin_email.clone(),
        iat: now.timestamp() as u64,
        exp: expiry.timestamp() as u64,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| OrgError::Internal(anyhow::anyhow!("failed to sign claims: {e}")))
}

/// Verifies a token's signature and expiry and extracts its claims.
pub fn decode_claims(config: &AppConfig, token: &str) -> Result<Claims, OrgError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| OrgError::unauthorized("Unauthorized: Invalid token"))
}

/// Checks that the caller's claims identify the target organization.
pub fn ensure_owner(claims: &Claims, org: &OrganizationModel) -> Result<(), OrgError> {
    if claims.org_id == org.id {
        Ok(())
    } else {
        Err(OrgError::unauthorized(
            "Unauthorized: Not your organization",
        ))
    }
}

/// Authentication middleware that validates bearer tokens on mutating routes.
///
/// Decodes the token and stores the claims in request extensions; ownership
/// against the target record is checked later by the orchestrator, after the
/// record is loaded.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, OrgError> {
    let token = extract_bearer_token(request.headers())?;
    let claims = decode_claims(&config, token)?;

    tracing::debug!(org_id = %claims.org_id, "authenticated request");

    let mut request = request;
    request.extensions_mut().insert(ClaimsExtension(claims));

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, OrgError> {
    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| OrgError::unauthorized("Unauthorized: Missing token"))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| OrgError::unauthorized("Unauthorized: Invalid token"))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| OrgError::unauthorized("Unauthorized: Missing token"))
        })
}

impl<S> FromRequestParts<S> for ClaimsExtension
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = OrgError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ClaimsExtension>()
            .cloned()
            .ok_or_else(|| OrgError::unauthorized("Unauthorized: Missing token"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn test_config() -> AppConfig {
        AppConfig {
            jwt_secret: "test-secret".to_string(),
            ..Default::default()
        }
    }

    fn test_org() -> OrganizationModel {
        OrganizationModel {
            id: Uuid::new_v4(),
            organization_name: "Acme Corp".to_string(),
            admin_email: "admin@acme.example".to_string(),
            credential: "$argon2id$irrelevant".to_string(),
            collection_name: "org_acme_corp".to_string(),
            created_at: Utc::now().into(),
        }
    }

    async fn run_middleware(config: Arc<AppConfig>, request: Request<Body>) -> Response {
        async fn handler() -> &'static str {
            "OK"
        }

        Router::new()
            .route("/test", get(handler))
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(&config),
                auth_middleware,
            ))
            .with_state(AppState {
                config,
                db: sea_orm::DatabaseConnection::default(),
            })
            .oneshot(request)
            .await
            .unwrap()
    }

    #[test]
    fn issue_then_decode_round_trips() {
        let config = test_config();
        let org = test_org();

        let token = issue_claims(&config, &org).unwrap();
        let claims = decode_claims(&config, &token).unwrap();

        assert_eq!(claims.org_id, org.id);
        assert_eq!(claims.org_name, "Acme Corp");
        assert_eq!(claims.collection_name, "org_acme_corp");
        assert_eq!(claims.email, "admin@acme.example");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_claims(&config, &test_org()).unwrap();

        let other = AppConfig {
            jwt_secret: "another-secret".to_string(),
            ..Default::default()
        };
        let err = decode_claims(&other, &token).unwrap_err();
        assert!(matches!(err, OrgError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let org = test_org();

        let now = Utc::now().timestamp() as u64;
        let claims = Claims {
            org_id: org.id,
            org_name: org.organization_name,
            collection_name: org.collection_name,
            email: org.admin_email,
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        let err = decode_claims(&config, &token).unwrap_err();
        assert!(matches!(err, OrgError::Unauthorized(_)));
    }

    #[test]
    fn owner_gate_compares_tenant_ids() {
        let config = test_config();
        let org = test_org();
        let token = issue_claims(&config, &org).unwrap();
        let claims = decode_claims(&config, &token).unwrap();

        assert!(ensure_owner(&claims, &org).is_ok());

        let other = test_org();
        let err = ensure_owner(&claims, &other).unwrap_err();
        assert!(matches!(err, OrgError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn missing_auth_header_returns_401() {
        let config = Arc::new(test_config());
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(config, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn non_bearer_scheme_returns_401() {
        let config = Arc::new(test_config());
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Basic dGVzdDoxMjM=")
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(config, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_returns_401() {
        let config = Arc::new(test_config());
        let request = Request::builder()
            .uri("/test")
            .header("Authorization", "Bearer not-a-jwt")
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(config, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_passes_through() {
        let config = Arc::new(test_config());
        let token = issue_claims(&config, &test_org()).unwrap();

        let request = Request::builder()
            .uri("/test")
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let response = run_middleware(config, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
