//! Error types for the client store.

use thiserror::Error;
use uuid::Uuid;

use crate::models::ClientStatus;

/// Errors that can occur while reading or writing durable client state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Client not found.
    #[error("Client {0} not found")]
    ClientNotFound(Uuid),

    /// The requested domain is already registered to an active client.
    #[error("Domain already registered: {0}")]
    DuplicateDomain(String),

    /// The requested status change violates the lifecycle state machine.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ClientStatus,
        to: ClientStatus,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
