//! CRUD handlers for client sites.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use siteforge_core::ClientId;
use siteforge_provisioning::ProvisionError;
use siteforge_store::ClientFilter;

use crate::error::{ApiError, FieldViolation};
use crate::models::{
    ClientListResponse, ClientResponse, CreateClientRequest, DeprovisionResponse,
    ProvisionResponse, UpdateClientRequest,
};
use crate::router::ClientsAppState;

/// GET /clients
///
/// List client sites with optional status/template/search filters,
/// paginated.
#[utoipa::path(
    get,
    path = "/clients",
    params(
        ("status" = Option<String>, Query, description = "Filter by lifecycle status"),
        ("template" = Option<String>, Query, description = "Filter by template id"),
        ("search" = Option<String>, Query, description = "Match against name or domain"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("per_page" = Option<u32>, Query, description = "Page size (1-100)"),
    ),
    responses(
        (status = 200, description = "One page of clients", body = ClientListResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
    tag = "Clients",
)]
pub async fn list_clients_handler(
    State(state): State<ClientsAppState>,
    Query(filter): Query<ClientFilter>,
) -> Result<Json<ClientListResponse>, ApiError> {
    let page = state.store.list_clients(&filter).await?;
    Ok(Json(ClientListResponse::from(page)))
}

/// POST /clients
///
/// Create and provision a new client site. Runs the full provisioning
/// pipeline; the response carries the complete audit log of the run,
/// including the partial log of a failed run.
///
/// # Errors
///
/// - 400 Bad Request: request validation failed (all violated fields listed)
/// - 409 Conflict: domain already in use or currently provisioning
/// - 500 Internal Server Error: a critical pipeline step failed; the body is
///   the failed outcome with its audit log
#[utoipa::path(
    post,
    path = "/clients",
    request_body = CreateClientRequest,
    responses(
        (status = 200, description = "Client provisioned", body = ProvisionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Domain conflict", body = ErrorResponse),
        (status = 500, description = "Provisioning failed, body carries the partial audit log", body = ProvisionResponse),
    ),
    tag = "Clients",
)]
pub async fn create_client_handler(
    State(state): State<ClientsAppState>,
    Json(body): Json<CreateClientRequest>,
) -> Result<Response, ApiError> {
    let outcome = state
        .provisioner
        .provision(body.into(), state.cancel.child_token())
        .await;

    match outcome.error {
        // Rejections keep the structured error body.
        Some(error @ ProvisionError::Validation(_)) | Some(error @ ProvisionError::Conflict(_)) => {
            Err(ApiError::from(error))
        }
        // Pipeline failures return the outcome itself so the caller sees
        // what ran, what failed and what was rolled back.
        Some(_) => Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProvisionResponse::from(outcome)),
        )
            .into_response()),
        None => Ok(Json(ProvisionResponse::from(outcome)).into_response()),
    }
}

/// GET /clients/{id}
#[utoipa::path(
    get,
    path = "/clients/{id}",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Client details", body = ClientResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
    ),
    tag = "Clients",
)]
pub async fn get_client_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<ClientResponse>, ApiError> {
    let client = state
        .store
        .get_client(id.into_uuid())
        .await?
        .ok_or(ApiError::ClientNotFound(id.into_uuid()))?;
    Ok(Json(ClientResponse::from(client)))
}

/// PATCH /clients/{id}
///
/// Partial configuration update. Domain and template are fixed at
/// provisioning time.
#[utoipa::path(
    patch,
    path = "/clients/{id}",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Updated client", body = ClientResponse),
        (status = 400, description = "Empty or invalid body", body = ErrorResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
    ),
    tag = "Clients",
)]
pub async fn update_client_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::Validation(vec![FieldViolation {
            field: "body".to_string(),
            reason: "no updatable fields supplied".to_string(),
        }]));
    }

    let mut client = state
        .store
        .get_client(id.into_uuid())
        .await?
        .ok_or(ApiError::ClientNotFound(id.into_uuid()))?;

    if let Some(name) = body.name {
        client.name = name;
    }
    if let Some(email) = body.contact_email {
        client.contact_email = email;
    }
    if let Some(plan) = body.plan {
        client.plan = plan;
    }
    if let Some(features) = body.features {
        client.features = serde_json::to_value(features).unwrap_or(serde_json::Value::Null);
    }

    let updated = state.store.update_client(&client).await?;
    Ok(Json(ClientResponse::from(updated)))
}

/// DELETE /clients/{id}
///
/// Deprovision the client: release every external resource and archive the
/// record. Idempotent; repeating it reports the resources as already absent.
#[utoipa::path(
    delete,
    path = "/clients/{id}",
    params(("id" = uuid::Uuid, Path, description = "Client identifier")),
    responses(
        (status = 200, description = "Teardown result with audit log", body = DeprovisionResponse),
        (status = 404, description = "Unknown client", body = ErrorResponse),
        (status = 409, description = "Client busy", body = ErrorResponse),
    ),
    tag = "Clients",
)]
pub async fn delete_client_handler(
    State(state): State<ClientsAppState>,
    Path(id): Path<ClientId>,
) -> Result<Json<DeprovisionResponse>, ApiError> {
    let outcome = state.deprovisioner.deprovision(id.into_uuid()).await?;
    Ok(Json(DeprovisionResponse {
        success: outcome.success,
        client_id: ClientId::from_uuid(outcome.client_id),
        failed_steps: outcome
            .failed_steps
            .into_iter()
            .map(str::to_string)
            .collect(),
        log: outcome.log.into_iter().map(Into::into).collect(),
    }))
}
