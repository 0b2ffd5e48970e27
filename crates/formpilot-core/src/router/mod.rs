//! Client-side routing.
//!
//! - `ROUTES`: the static route table (`RouteDescriptor`s)
//! - `RouteGuard`: allow or redirect a navigation based on an `AuthState`
//! - `Router`: path resolution, history and reverse lookup on top of both

pub mod guard;
pub mod navigator;
pub mod route;

pub use guard::{AuthState, GuardDecision, RouteGuard};
pub use navigator::{Navigation, Router};
pub use route::{RouteDescriptor, RouteMatch, View, LOGIN_PATH, ROUTES};
