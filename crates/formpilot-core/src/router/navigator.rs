//! History-backed router that runs the guard before every navigation.

use tracing::debug;

use super::guard::{AuthState, GuardDecision, RouteGuard};
use super::route::{self, RouteDescriptor, RouteMatch, ROUTES};

/// Outcome of a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Allowed(RouteMatch),
    /// The guard sent the user to `to` instead of `requested`
    Redirected { requested: String, to: RouteMatch },
    NotFound(String),
}

impl Navigation {
    /// Where the navigation landed, if anywhere
    pub fn landed(&self) -> Option<&RouteMatch> {
        match self {
            Navigation::Allowed(m) => Some(m),
            Navigation::Redirected { to, .. } => Some(to),
            Navigation::NotFound(_) => None,
        }
    }
}

pub struct Router<S> {
    routes: Vec<RouteDescriptor>,
    guard: RouteGuard<S>,
    /// Mount point, always with a leading and no trailing slash ("" for root)
    base: String,
    history: Vec<RouteMatch>,
}

impl<S: AuthState> Router<S> {
    /// Router over the application's route table
    pub fn new(guard: RouteGuard<S>) -> Self {
        Self::with_routes(ROUTES.to_vec(), guard)
    }

    pub fn with_routes(routes: Vec<RouteDescriptor>, guard: RouteGuard<S>) -> Self {
        Self {
            routes,
            guard,
            base: String::new(),
            history: Vec::new(),
        }
    }

    /// Mount the router under `base`, e.g. `/app`
    pub fn with_base(mut self, base: &str) -> Self {
        let normalized = route::normalize(base);
        self.base = if normalized == "/" { String::new() } else { normalized };
        self
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn guard(&self) -> &RouteGuard<S> {
        &self.guard
    }

    pub fn current(&self) -> Option<&RouteMatch> {
        self.history.last()
    }

    /// Match `path` without consulting the guard
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        route::resolve(&self.routes, &self.strip_base(path))
    }

    /// Navigate to `path`, pushing a history entry when it lands
    pub fn push(&mut self, path: &str) -> Navigation {
        let navigation = self.navigate(path);
        if let Some(landed) = navigation.landed() {
            if self.current() != Some(landed) {
                self.history.push(landed.clone());
            }
        }
        navigation
    }

    /// Go back one entry. The previous location is re-checked by the guard.
    /// History is left untouched unless the navigation lands.
    pub fn back(&mut self) -> Option<Navigation> {
        let len = self.history.len();
        if len < 2 {
            return None;
        }

        // Stored entries are already relative to the base
        let navigation = self.navigate_app_path(&self.history[len - 2].path);
        if let Some(landed) = navigation.landed() {
            self.history.truncate(len - 2);
            if self.current() != Some(landed) {
                self.history.push(landed.clone());
            }
        }
        Some(navigation)
    }

    /// Reverse lookup by route name, including the base path
    pub fn href(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let route = self.routes.iter().find(|r| r.name == name)?;
        let path = route.build(params)?;
        if self.base.is_empty() {
            Some(path)
        } else if path == "/" {
            Some(self.base.clone())
        } else {
            Some(format!("{}{}", self.base, path))
        }
    }

    fn navigate(&self, path: &str) -> Navigation {
        self.navigate_app_path(&self.strip_base(path))
    }

    /// Resolve and guard a path that has no base prefix
    fn navigate_app_path(&self, path: &str) -> Navigation {
        let Some(target) = route::resolve(&self.routes, path) else {
            debug!(path, "No route matches");
            return Navigation::NotFound(route::normalize(path));
        };

        match self.guard.check(&target.route) {
            GuardDecision::Allow => Navigation::Allowed(target),
            GuardDecision::Redirect(to) => {
                debug!(path = %target.path, to, "Navigation redirected by guard");
                match route::resolve(&self.routes, to) {
                    Some(login) => Navigation::Redirected {
                        requested: target.path,
                        to: login,
                    },
                    None => Navigation::NotFound(to.to_string()),
                }
            }
        }
    }

    fn strip_base(&self, path: &str) -> String {
        let normalized = route::normalize(path);
        if self.base.is_empty() {
            return normalized;
        }
        match normalized.strip_prefix(&self.base) {
            Some("") => "/".to_string(),
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => normalized,
        }
    }
}
