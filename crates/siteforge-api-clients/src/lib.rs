//! Client management HTTP API for siteforge.
//!
//! The HTTP layer never touches adapters directly: handlers call the
//! orchestrators and the store, and map their results to the JSON contract.
//! Errors go through [`error::ApiError`], which renders the status-code
//! mapping in one place.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;

pub use error::{ApiError, ErrorResponse};
pub use router::{clients_router, ClientsAppState};
