//! Persistent entities for siteforge.

pub mod client;
pub mod deployment;

pub use client::{Client, ClientStatus};
pub use deployment::{Deployment, DeploymentTrigger};
