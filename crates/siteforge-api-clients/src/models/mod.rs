//! Request and response models for the client management API.

pub mod requests;
pub mod responses;

pub use requests::{CreateClientRequest, SuspendClientRequest, UpdateClientRequest};
pub use responses::{
    ClientListResponse, ClientResponse, DeploymentEntry, DeploymentListResponse,
    DeprovisionResponse, HealthResponse, LogEntryBody, ProvisionResponse, RedeployResponse,
    StatsResponse,
};
