//! Health, deployment history and redeploy handlers.

use axum::extract::{Path, State};
use axum::Json;

use siteforge_core::{ClientId, DeploymentId};

use crate::error::ApiError;
use crate::models::responses::DeploymentListResponse;
use crate::models::{HealthResponse, RedeployResponse};
use crate::router::ClientsAppState;

/// GET /clients/{id}/health
///
/// Platform-level health of a client site: its lifecycle status and the age
/// of the tenant record.
#[utoipa::path(
    get,
    path = "/clients/{id}/health",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Health summary", body = HealthResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
    ),
    tag = "Deployments",
)]
pub async fn health_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<HealthResponse>, ApiError> {
    let client = state
        .store
        .get_client(id.into_uuid())
        .await?
        .ok_or(ApiError::ClientNotFound(id.into_uuid()))?;

    Ok(Json(HealthResponse {
        status: client.status.to_string(),
        uptime_secs: client.uptime_secs(),
        deployment_url: client.deployment_url,
    }))
}

/// GET /clients/{id}/deployments
///
/// Deployment history: live provider data when a real provider is
/// configured, otherwise the locally recorded rows.
#[utoipa::path(
    get,
    path = "/clients/{id}/deployments",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Deployment history", body = DeploymentListResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
    ),
    tag = "Deployments",
)]
pub async fn list_deployments_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<DeploymentListResponse>, ApiError> {
    let history = state.provisioner.deployment_history(id.into_uuid()).await?;
    Ok(Json(DeploymentListResponse::from(history)))
}

/// POST /clients/{id}/redeploy
///
/// Trigger a new deployment of the client's site. Returns a placeholder
/// result when the deployment provider is unconfigured.
#[utoipa::path(
    post,
    path = "/clients/{id}/redeploy",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Deployment triggered", body = RedeployResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
        (status = 409, description = "Status does not allow redeploy", body = ErrorResponse),
        (status = 500, description = "Provider redeploy failed", body = ErrorResponse),
    ),
    tag = "Deployments",
)]
pub async fn redeploy_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<RedeployResponse>, ApiError> {
    let outcome = state.provisioner.redeploy(id.into_uuid()).await?;
    Ok(Json(RedeployResponse {
        deployment_id: DeploymentId::from_uuid(outcome.deployment.id),
        deployment_url: outcome.deployment.url,
        state: outcome.deployment.status,
        mock: outcome.mock,
    }))
}
