//! Navigation guard.
//!
//! The guard only steers the UI: it reads the in-memory session flag and
//! never asks the backend whether the token is still valid. Protected data
//! must still be enforced server-side.

use crate::auth::SessionStore;

use super::route::{RouteDescriptor, LOGIN_PATH};

/// Source of the "is the user logged in" hint consulted by the guard.
pub trait AuthState {
    fn is_authenticated(&self) -> bool;
}

impl AuthState for SessionStore {
    fn is_authenticated(&self) -> bool {
        SessionStore::is_authenticated(self)
    }
}

impl AuthState for bool {
    fn is_authenticated(&self) -> bool {
        *self
    }
}

impl<T: AuthState + ?Sized> AuthState for &T {
    fn is_authenticated(&self) -> bool {
        (**self).is_authenticated()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Navigation must go to this path instead
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
pub struct RouteGuard<S> {
    auth: S,
    login_path: &'static str,
}

impl<S: AuthState> RouteGuard<S> {
    pub fn new(auth: S) -> Self {
        Self {
            auth,
            login_path: LOGIN_PATH,
        }
    }

    pub fn login_path(&self) -> &'static str {
        self.login_path
    }

    pub fn auth(&self) -> &S {
        &self.auth
    }

    /// Decide whether navigation to `target` may complete
    pub fn check(&self, target: &RouteDescriptor) -> GuardDecision {
        if target.requires_auth && !self.auth.is_authenticated() {
            GuardDecision::Redirect(self.login_path)
        } else {
            GuardDecision::Allow
        }
    }
}
