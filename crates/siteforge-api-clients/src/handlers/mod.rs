//! HTTP handlers for the client management API.

pub mod clients;
pub mod deployments;
pub mod lifecycle;
pub mod stats;

pub use clients::{
    create_client_handler, delete_client_handler, get_client_handler, list_clients_handler,
    update_client_handler,
};
pub use deployments::{health_handler, list_deployments_handler, redeploy_handler};
pub use lifecycle::{activate_handler, suspend_handler};
pub use stats::stats_handler;
