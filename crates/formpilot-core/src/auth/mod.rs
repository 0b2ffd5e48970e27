//! Authentication module for the client-side session.
//!
//! This module provides:
//! - `SessionStore`: the owned, injectable session context with
//!   `register`, `login` and `logout`
//! - `Credentials`: transient email/password input
//! - `AuthError` / `FailureKind`: typed outcomes of the store operations
//!
//! Session state lives in memory only and is gone when the process exits.

pub mod credentials;
pub mod error;
pub mod session;

pub use credentials::Credentials;
pub use error::{AuthError, FailureKind};
pub use session::{SessionState, SessionStore, LOGIN_FAILED_MESSAGE, REGISTRATION_FAILED_MESSAGE};
