//! Core library for formpilot.
//!
//! Provides the HTTP client for the forms backend, the in-memory session
//! store built on it, and the guarded client-side router.

pub mod api;
pub mod auth;
pub mod config;
pub mod router;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, Credentials, FailureKind, SessionState, SessionStore};
pub use config::Config;
pub use router::{Navigation, RouteGuard, Router};
