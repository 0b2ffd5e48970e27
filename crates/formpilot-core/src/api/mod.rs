//! HTTP client module for the forms backend.
//!
//! This module provides the `ApiClient` used by the session store to
//! create users and log in. The client keeps a default header map shared
//! by all of its clones, so a token installed after login is attached to
//! every later request.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
