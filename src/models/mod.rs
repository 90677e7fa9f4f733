//! Database models and request-scoped data shared across the service.

#[cfg(feature = "server")]
pub mod auth;
pub mod campaign;
pub mod client;
#[cfg(feature = "server")]
pub mod config;
pub mod deliverable;
pub mod invoice;
pub mod messaging;
pub mod team_member;
pub mod wallet;
pub mod workspace;
