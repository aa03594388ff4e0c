//! Router configuration for the client management API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use siteforge_provisioning::{DeprovisioningOrchestrator, ProvisioningOrchestrator};
use siteforge_store::ClientStore;

use crate::handlers::{
    activate_handler, create_client_handler, delete_client_handler, get_client_handler,
    health_handler, list_clients_handler, list_deployments_handler, redeploy_handler,
    stats_handler, suspend_handler, update_client_handler,
};

/// Application state for the client management API.
#[derive(Clone)]
pub struct ClientsAppState {
    /// Durable tenant state.
    pub store: Arc<dyn ClientStore>,
    /// Runs the provisioning pipeline and redeploys.
    pub provisioner: Arc<ProvisioningOrchestrator>,
    /// Runs teardown.
    pub deprovisioner: Arc<DeprovisioningOrchestrator>,
    /// Cancelled on shutdown; in-flight provisioning runs stop between steps
    /// and compensate.
    pub cancel: CancellationToken,
}

/// Create the client management router.
///
/// Provides:
/// - GET    /clients                  - list clients (filters + pagination)
/// - POST   /clients                  - create and provision
/// - GET    /clients/{id}             - client details
/// - PATCH  /clients/{id}             - partial config update
/// - DELETE /clients/{id}             - deprovision and archive
/// - POST   /clients/{id}/suspend     - suspend serving
/// - POST   /clients/{id}/activate    - resume serving
/// - GET    /clients/{id}/health      - platform-level health
/// - GET    /clients/{id}/deployments - deployment history
/// - POST   /clients/{id}/redeploy    - trigger a redeploy
/// - GET    /stats                    - aggregate counts
pub fn clients_router(state: ClientsAppState) -> Router {
    Router::new()
        .route(
            "/clients",
            get(list_clients_handler).post(create_client_handler),
        )
        .route(
            "/clients/:id",
            get(get_client_handler)
                .patch(update_client_handler)
                .delete(delete_client_handler),
        )
        .route("/clients/:id/suspend", post(suspend_handler))
        .route("/clients/:id/activate", post(activate_handler))
        .route("/clients/:id/health", get(health_handler))
        .route("/clients/:id/deployments", get(list_deployments_handler))
        .route("/clients/:id/redeploy", post(redeploy_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}
