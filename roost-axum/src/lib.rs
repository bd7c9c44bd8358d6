//! roost-axum: Axum adapter for the Roost API.
//!
//! Structured error responses, the caller/body/id extractors, and the
//! layer stack shared by every endpoint.

pub mod app;
pub mod extract;
mod error;

pub use app::AxumApp;
pub use error::RoostAxumError;
pub use extract::{Authenticated, Body, Guest, HasGuestTokens, HasVerifier, ValidId};
