//! Aggregate platform statistics.

use axum::extract::State;
use axum::Json;

use crate::error::ApiError;
use crate::models::StatsResponse;
use crate::router::ClientsAppState;

/// GET /stats
#[utoipa::path(
    get,
    path = "/stats",
    responses(
        (status = 200, description = "Aggregate counts", body = StatsResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
    ),
    tag = "Stats",
)]
pub async fn stats_handler(
    State(state): State<ClientsAppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store.stats().await?;
    Ok(Json(StatsResponse::from(stats)))
}
