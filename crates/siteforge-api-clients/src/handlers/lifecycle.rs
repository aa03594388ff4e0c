//! Suspend/activate handlers.

use axum::extract::{Path, State};
use axum::Json;

use siteforge_core::ClientId;

use crate::error::ApiError;
use crate::models::{ClientResponse, SuspendClientRequest};
use crate::router::ClientsAppState;

const DEFAULT_SUSPENSION_REASON: &str = "suspended by operator";

/// POST /clients/{id}/suspend
///
/// Disable serving without destroying resources. The operator reason is
/// recorded on the client.
#[utoipa::path(
    post,
    path = "/clients/{id}/suspend",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    request_body = SuspendClientRequest,
    responses(
        (status = 200, description = "Suspended client", body = ClientResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
        (status = 409, description = "Status does not allow suspension", body = ErrorResponse),
    ),
    tag = "Lifecycle",
)]
pub async fn suspend_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
    body: Option<Json<SuspendClientRequest>>,
) -> Result<Json<ClientResponse>, ApiError> {
    let reason = body
        .and_then(|Json(b)| b.reason)
        .unwrap_or_else(|| DEFAULT_SUSPENSION_REASON.to_string());

    let client = state.store.suspend(id.into_uuid(), &reason).await?;
    tracing::info!(client_id = %id, reason, "client suspended");
    Ok(Json(ClientResponse::from(client)))
}

/// POST /clients/{id}/activate
///
/// Re-enable a suspended client.
#[utoipa::path(
    post,
    path = "/clients/{id}/activate",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Reactivated client", body = ClientResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
        (status = 409, description = "Client is not suspended", body = ErrorResponse),
    ),
    tag = "Lifecycle",
)]
pub async fn activate_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state.store.activate(id.into_uuid()).await?;
    tracing::info!(client_id = %id, "client reactivated");
    Ok(Json(ClientResponse::from(client)))
}
