//! # Server Configuration
//!
//! This module contains the server setup and configuration for the
//! Orgstore API: shared application state, the router, and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::auth_middleware;
use crate::config::AppConfig;
use crate::handlers;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    // Mutating organization routes sit behind the bearer-token gate; the
    // token is decoded here, ownership is checked by the orchestrator.
    let protected = Router::new()
        .route("/org/update", put(handlers::orgs::update_org))
        .route("/org/delete", delete(handlers::orgs::delete_org))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.config),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/org/create", post(handlers::orgs::create_org))
        .route("/admin/login", post(handlers::orgs::login_admin))
        .route("/org/get", get(handlers::orgs::get_org))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;
    let profile = config.profile.clone();

    let state = AppState {
        config: Arc::new(config),
        db,
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::orgs::create_org,
        crate::handlers::orgs::login_admin,
        crate::handlers::orgs::get_org,
        crate::handlers::orgs::update_org,
        crate::handlers::orgs::delete_org,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::orgs::CreateOrgRequest,
            crate::handlers::orgs::LoginRequest,
            crate::handlers::orgs::UpdateOrgRequest,
            crate::handlers::orgs::DeleteOrgRequest,
            crate::handlers::orgs::OrgSummary,
            crate::handlers::orgs::LoginData,
            crate::handlers::orgs::OrgInfo,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Orgstore API",
        description = "API for provisioning per-organization storage collections",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
