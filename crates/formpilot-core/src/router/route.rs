//! Static route table and path matching.

use std::collections::BTreeMap;

/// Page a route renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    EditForm,
    PublicForm,
    FormResponses,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Login => "Log in",
            View::Register => "Register",
            View::Dashboard => "Dashboard",
            View::EditForm => "Edit form",
            View::PublicForm => "Form",
            View::FormResponses => "Responses",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    /// Pattern with `:param` segments, e.g. `/forms/:formId/edit`
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

/// Path of the route unauthenticated navigation is sent to
pub const LOGIN_PATH: &str = "/login";

/// The application's routes, in match order.
pub const ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        path: "/",
        name: "home",
        view: View::Home,
        requires_auth: false,
    },
    RouteDescriptor {
        path: LOGIN_PATH,
        name: "login",
        view: View::Login,
        requires_auth: false,
    },
    RouteDescriptor {
        path: "/register",
        name: "register",
        view: View::Register,
        requires_auth: false,
    },
    RouteDescriptor {
        path: "/forms/dashboard",
        name: "dashboard",
        view: View::Dashboard,
        requires_auth: true,
    },
    RouteDescriptor {
        path: "/forms/:formId/edit",
        name: "editForm",
        view: View::EditForm,
        requires_auth: true,
    },
    RouteDescriptor {
        path: "/forms/:formId",
        name: "publicForm",
        view: View::PublicForm,
        requires_auth: false,
    },
    RouteDescriptor {
        path: "/forms/:formId/responses",
        name: "formResponses",
        view: View::FormResponses,
        requires_auth: true,
    },
];

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: RouteDescriptor,
    /// Normalized path that was matched
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Path segments with query string, fragment and empty segments removed
pub(crate) fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

pub(crate) fn normalize(path: &str) -> String {
    format!("/{}", segments(path).join("/"))
}

impl RouteDescriptor {
    /// Match `path` against this route's pattern, capturing `:param` segments
    pub fn matches(&self, path: &str) -> Option<RouteMatch> {
        let pattern = segments(self.path);
        let actual = segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, got) in pattern.iter().zip(&actual) {
            if let Some(name) = expected.strip_prefix(':') {
                params.insert(name.to_string(), (*got).to_string());
            } else if expected != got {
                return None;
            }
        }

        Some(RouteMatch {
            route: *self,
            path: format!("/{}", actual.join("/")),
            params,
        })
    }

    /// Build a concrete path from this pattern. Fails if a parameter is missing.
    pub fn build(&self, params: &[(&str, &str)]) -> Option<String> {
        let mut out = Vec::new();
        for seg in segments(self.path) {
            match seg.strip_prefix(':') {
                Some(name) => {
                    let value = params.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)?;
                    if value.is_empty() || value.contains('/') {
                        return None;
                    }
                    out.push(value);
                }
                None => out.push(seg),
            }
        }
        Some(format!("/{}", out.join("/")))
    }
}

/// First route in `routes` matching `path`
pub fn resolve(routes: &[RouteDescriptor], path: &str) -> Option<RouteMatch> {
    routes.iter().find_map(|r| r.matches(path))
}
