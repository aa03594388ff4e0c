//! siteforge Core Library
//!
//! Shared types for the siteforge provisioning platform.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (`ClientId`, `DeploymentId`)

pub mod ids;

pub use ids::{ClientId, DeploymentId, ParseIdError};
