use thiserror::Error;

use crate::api::ApiError;

/// Coarse cause of a failed store operation, for callers that need to
/// tell an unreachable backend apart from rejected credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never got a response (connect error, timeout, ...)
    Network,
    /// The backend answered with a 4xx
    Rejected,
    /// The backend answered with a 5xx or asked us to slow down
    Server,
    /// The backend answered 2xx but the body was unusable
    InvalidResponse,
}

impl From<&ApiError> for FailureKind {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::NetworkError(_) => FailureKind::Network,
            ApiError::ServerError(_) | ApiError::RateLimited => FailureKind::Server,
            ApiError::InvalidResponse(_) | ApiError::InvalidHeader(_) => {
                FailureKind::InvalidResponse
            }
            e if e.is_rejection() => FailureKind::Rejected,
            _ => FailureKind::InvalidResponse,
        }
    }
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Registration failed: {source}")]
    Registration {
        kind: FailureKind,
        #[source]
        source: ApiError,
    },

    #[error("Login failed: {source}")]
    Login {
        kind: FailureKind,
        #[source]
        source: ApiError,
    },

    /// A newer login or a logout was issued while this login was in flight
    #[error("Login superseded by a newer session change")]
    Superseded,
}

impl AuthError {
    pub(crate) fn registration(source: ApiError) -> Self {
        AuthError::Registration {
            kind: FailureKind::from(&source),
            source,
        }
    }

    pub(crate) fn login(source: ApiError) -> Self {
        AuthError::Login {
            kind: FailureKind::from(&source),
            source,
        }
    }

    /// The failure cause, or `None` for a superseded login
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            AuthError::Registration { kind, .. } | AuthError::Login { kind, .. } => Some(*kind),
            AuthError::Superseded => None,
        }
    }
}
