//! Durable client-site state for siteforge.
//!
//! The [`ClientStore`] trait is the single writer of durable tenant state.
//! Two implementations are provided:
//!
//! - [`PgClientStore`] — Postgres-backed, used in production.
//! - [`MemoryClientStore`] — in-process, used in tests and in environments
//!   without a configured database.
//!
//! Status transitions go through [`ClientStatus::can_transition_to`]; the
//! store rejects writes that would violate the lifecycle state machine.

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryClientStore;
pub use models::{Client, ClientStatus, Deployment, DeploymentTrigger};
pub use postgres::PgClientStore;
pub use store::{ClientFilter, ClientPage, ClientStore, NewClient, PlatformStats};
