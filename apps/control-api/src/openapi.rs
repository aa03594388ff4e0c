//! `OpenAPI` spec generation and Swagger UI wiring.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use siteforge_api_clients::error::{ErrorResponse, FieldViolation};
use siteforge_api_clients::models::{
    ClientListResponse, ClientResponse, CreateClientRequest, DeploymentEntry,
    DeploymentListResponse, DeprovisionResponse, HealthResponse, LogEntryBody, ProvisionResponse,
    RedeployResponse, StatsResponse, SuspendClientRequest, UpdateClientRequest,
};

/// `OpenAPI` documentation for the control-plane API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "siteforge control API",
        version = "0.1.0",
        description = "Provisioning and lifecycle management for client sites",
    ),
    paths(
        siteforge_api_clients::handlers::clients::list_clients_handler,
        siteforge_api_clients::handlers::clients::create_client_handler,
        siteforge_api_clients::handlers::clients::get_client_handler,
        siteforge_api_clients::handlers::clients::update_client_handler,
        siteforge_api_clients::handlers::clients::delete_client_handler,
        siteforge_api_clients::handlers::lifecycle::suspend_handler,
        siteforge_api_clients::handlers::lifecycle::activate_handler,
        siteforge_api_clients::handlers::deployments::health_handler,
        siteforge_api_clients::handlers::deployments::list_deployments_handler,
        siteforge_api_clients::handlers::deployments::redeploy_handler,
        siteforge_api_clients::handlers::stats::stats_handler,
    ),
    components(schemas(
        CreateClientRequest,
        UpdateClientRequest,
        SuspendClientRequest,
        ClientResponse,
        ClientListResponse,
        ProvisionResponse,
        DeprovisionResponse,
        LogEntryBody,
        HealthResponse,
        DeploymentEntry,
        DeploymentListResponse,
        RedeployResponse,
        StatsResponse,
        ErrorResponse,
        FieldViolation,
    )),
    tags(
        (name = "Clients", description = "Client site CRUD and provisioning"),
        (name = "Lifecycle", description = "Suspend and reactivate client sites"),
        (name = "Deployments", description = "Health, deployment history, redeploys"),
        (name = "Stats", description = "Platform-wide counters"),
    )
)]
pub struct ApiDoc;

/// Swagger UI at `/docs`, spec at `/api-docs/openapi.json`.
pub fn swagger_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
