//! Tempo Cloud transport.
//!
//! [`TempoClient`] implements [`crate::sync::RemoteWorklogPort`] over the
//! Tempo REST API with bearer-token authentication.

mod client;
mod models;

pub use client::{TempoClient, TempoConfig, DEFAULT_BASE_URL};
