//! Shell state for formpilot.
//!
//! `App` owns the session store and a router guarded by that same store,
//! and turns parsed commands into store operations and navigations.

use anyhow::Result;
use tracing::{debug, warn};

use formpilot_core::router::{Navigation, RouteGuard, Router};
use formpilot_core::{ApiClient, AuthError, Config, Credentials, SessionStore};

use crate::input::{validate_credentials, Command, HELP};

/// Overall shell state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Quitting,
}

pub struct App {
    pub config: Config,
    pub session: SessionStore,
    pub router: Router<SessionStore>,
    pub state: AppState,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        debug!(base_url = api.base_url(), "API client configured");
        let session = SessionStore::new(api);
        let router = Router::new(RouteGuard::new(session.clone())).with_base(&config.base_path);

        Ok(Self {
            config,
            session,
            router,
            state: AppState::Normal,
        })
    }

    /// Land on the initial location
    pub fn start(&mut self) -> String {
        let nav = self.router.push("/");
        describe(&nav)
    }

    /// Run one command and return what should be shown to the user.
    /// `prompt_password` is only called for `login` and `register`.
    pub async fn execute<P>(&mut self, command: Command, prompt_password: P) -> String
    where
        P: FnOnce() -> Result<String>,
    {
        match command {
            Command::Login(email) => match self.credentials(email, prompt_password) {
                Ok(creds) => {
                    let result = self.session.login(&creds).await;
                    self.outcome(result, "Logged in")
                }
                Err(msg) => msg,
            },
            Command::Register(email) => match self.credentials(email, prompt_password) {
                Ok(creds) => {
                    let result = self.session.register(&creds).await;
                    self.outcome(result, "Account created, logged in")
                }
                Err(msg) => msg,
            },
            Command::Logout => {
                self.session.logout();
                "Logged out".to_string()
            }
            Command::Go(path) => describe(&self.router.push(&path)),
            Command::Back => match self.router.back() {
                Some(nav) => describe(&nav),
                None => "No previous page".to_string(),
            },
            Command::Status => self.status(),
            Command::Routes => self.route_list(),
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.state = AppState::Quitting;
                String::new()
            }
        }
    }

    fn credentials<P>(&self, email: String, prompt_password: P) -> Result<Credentials, String>
    where
        P: FnOnce() -> Result<String>,
    {
        let password = prompt_password().map_err(|e| {
            warn!(error = %e, "Failed to read password");
            "Could not read password".to_string()
        })?;
        validate_credentials(&email, &password)?;
        Ok(Credentials::new(email, password))
    }

    fn outcome(&self, result: Result<(), AuthError>, success: &str) -> String {
        match result {
            Ok(()) => success.to_string(),
            Err(AuthError::Superseded) => "Request superseded".to_string(),
            Err(_) => self.session.error_message(),
        }
    }

    fn status(&self) -> String {
        let state = self.session.snapshot();
        let location = self
            .router
            .current()
            .map(|m| m.path.clone())
            .unwrap_or_else(|| "-".to_string());
        let mut out = format!(
            "API: {}\nLogged in: {}\nAt: {}",
            self.config.api_base_url,
            if state.is_authenticated { "yes" } else { "no" },
            location
        );
        if !state.error_message.is_empty() {
            out.push_str(&format!("\nLast error: {}", state.error_message));
        }
        out
    }

    fn route_list(&self) -> String {
        self.router
            .routes()
            .iter()
            .map(|r| {
                format!(
                    "{} {:<28} {}",
                    if r.requires_auth { "*" } else { " " },
                    r.path,
                    r.name
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Render a navigation result the way the UI would show it.
/// Redirects carry no explanation.
pub fn describe(nav: &Navigation) -> String {
    match nav.landed() {
        Some(m) => format!("-> {} [{}]", m.path, m.route.view.title()),
        None => match nav {
            Navigation::NotFound(path) => format!("No page at {}", path),
            _ => String::new(),
        },
    }
}
