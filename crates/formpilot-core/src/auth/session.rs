//! In-memory session store.
//!
//! `SessionStore` owns the client's belief about whether the user is logged
//! in, plus the last human-readable error. It is a cheap-to-clone handle;
//! clones share state, separately constructed stores do not.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;

use super::{AuthError, Credentials};

/// Message shown after a failed `register`
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Message shown after a failed `login`
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials and try again.";

/// Observable session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub error_message: String,
}

struct Inner {
    api: ApiClient,
    state: watch::Sender<SessionState>,
    /// Bumped by every `login` and `logout`. A login response may only be
    /// applied while its generation is still current.
    generation: Mutex<u64>,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl SessionStore {
    /// Create a fresh, unauthenticated session around `api`
    pub fn new(api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                generation: Mutex::new(0),
            }),
        }
    }

    /// The shared HTTP client. Requests made through it carry the session's
    /// `Authorization` header once logged in.
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    pub fn error_message(&self) -> String {
        self.inner.state.borrow().error_message.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receive every subsequent state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Create an account, then log in with the same credentials.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if let Err(e) = self.inner.api.create_user(credentials).await {
            warn!(email = %credentials.email, error = %e, "Registration failed");
            self.set_error(REGISTRATION_FAILED_MESSAGE);
            return Err(AuthError::registration(e));
        }

        debug!(email = %credentials.email, "User created, logging in");
        self.login(credentials).await
    }

    /// Exchange credentials for a token and mark the session authenticated.
    ///
    /// On failure the authentication flag is left as it was. If another
    /// `login` or a `logout` happens while this request is in flight, the
    /// response is discarded and `AuthError::Superseded` is returned.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), AuthError> {
        let generation = self.next_generation();

        let result = self.inner.api.login(credentials).await;

        let current = self.lock_generation();
        if *current != generation {
            debug!(
                email = %credentials.email,
                generation,
                current = *current,
                "Discarding stale login response"
            );
            return Err(AuthError::Superseded);
        }

        let outcome = result.and_then(|response| self.inner.api.set_authorization(&response.token));

        match outcome {
            Ok(()) => {
                self.inner.state.send_modify(|s| {
                    s.is_authenticated = true;
                    s.error_message.clear();
                });
                info!(email = %credentials.email, "Login successful");
                Ok(())
            }
            Err(e) => {
                warn!(email = %credentials.email, error = %e, "Login failed");
                self.inner.state.send_modify(|s| {
                    s.error_message = LOGIN_FAILED_MESSAGE.to_string();
                });
                Err(AuthError::login(e))
            }
        }
    }

    /// Drop the session locally. No request is sent to the backend.
    pub fn logout(&self) {
        let mut current = self.lock_generation();
        *current += 1;
        self.inner.api.clear_authorization();
        self.inner.state.send_modify(|s| s.is_authenticated = false);
        info!("User logged out");
    }

    fn lock_generation(&self) -> std::sync::MutexGuard<'_, u64> {
        self.inner.generation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        let mut current = self.lock_generation();
        *current += 1;
        *current
    }

    fn set_error(&self, message: &str) {
        self.inner.state.send_modify(|s| s.error_message = message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::FailureKind;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    /// Matches requests that carry no `Authorization` header at all
    struct NoAuthorization;

    impl Match for NoAuthorization {
        fn matches(&self, request: &Request) -> bool {
            !request.headers.contains_key("authorization")
        }
    }

    fn store_for(server: &MockServer) -> SessionStore {
        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5))
            .expect("client should build");
        SessionStore::new(api)
    }

    fn creds(email: &str) -> Credentials {
        Credentials::new(email, "x")
    }

    async fn mount_login(server: &MockServer, email: &str, token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": email, "password": "x" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
            .mount(server)
            .await;
    }

    #[test]
    fn test_fresh_store_is_unauthenticated() {
        let api = ApiClient::with_base_url("http://localhost:3000", Duration::from_secs(1))
            .expect("client should build");
        let store = SessionStore::new(api);
        assert_eq!(store.snapshot(), SessionState::default());
        assert!(store.api().authorization().is_none());
    }

    #[tokio::test]
    async fn test_login_logout_scenario() {
        let server = MockServer::start().await;
        mount_login(&server, "a@b.com", "abc123").await;

        Mock::given(method("POST"))
            .and(path("/api/user"))
            .and(header("authorization", "abc123"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/user"))
            .and(NoAuthorization)
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.login(&creds("a@b.com")).await.expect("login should succeed");
        assert!(store.is_authenticated());
        assert_eq!(store.api().authorization().as_deref(), Some("abc123"));

        // Next request carries the token
        store.api().create_user(&creds("c@d.com")).await.expect("authorized request");

        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.api().authorization().is_none());

        // And the one after logout does not
        store.api().create_user(&creds("c@d.com")).await.expect("anonymous request");
    }

    #[tokio::test]
    async fn test_login_rejected_sets_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.login(&creds("a@b.com")).await.expect_err("login should fail");

        assert_eq!(err.kind(), Some(FailureKind::Rejected));
        assert!(!store.is_authenticated());
        assert_eq!(store.error_message(), LOGIN_FAILED_MESSAGE);
        assert!(store.api().authorization().is_none());
    }

    #[tokio::test]
    async fn test_login_server_error_is_distinguished() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.login(&creds("a@b.com")).await.expect_err("login should fail");
        assert_eq!(err.kind(), Some(FailureKind::Server));
        assert_eq!(store.error_message(), LOGIN_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_login_network_failure() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let url = format!("http://127.0.0.1:{}", port);
        let api = ApiClient::with_base_url(&url, Duration::from_secs(2))
            .expect("client should build");
        let store = SessionStore::new(api);

        let err = store.login(&creds("a@b.com")).await.expect_err("login should fail");
        assert_eq!(err.kind(), Some(FailureKind::Network));
        assert!(!store.is_authenticated());
        assert!(!store.error_message().is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_prior_authentication() {
        let server = MockServer::start().await;
        mount_login(&server, "a@b.com", "abc123").await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "wrong@b.com", "password": "x" })))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = store_for(&server);
        store.login(&creds("a@b.com")).await.expect("login should succeed");
        assert!(store.login(&creds("wrong@b.com")).await.is_err());

        assert!(store.is_authenticated());
        assert_eq!(store.api().authorization().as_deref(), Some("abc123"));
        assert_eq!(store.error_message(), LOGIN_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_successful_login_clears_previous_error() {
        let server = MockServer::start().await;
        mount_login(&server, "a@b.com", "abc123").await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "wrong@b.com", "password": "x" })))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let _ = store.login(&creds("wrong@b.com")).await;
        assert!(!store.error_message().is_empty());

        store.login(&creds("a@b.com")).await.expect("login should succeed");
        assert!(store.error_message().is_empty());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let server = MockServer::start().await;
        let store = store_for(&server);

        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
        assert!(store.api().authorization().is_none());
    }

    #[tokio::test]
    async fn test_register_matches_direct_login() {
        let server = MockServer::start().await;
        mount_login(&server, "a@b.com", "abc123").await;
        Mock::given(method("POST"))
            .and(path("/api/user"))
            .and(body_json(json!({ "email": "a@b.com", "password": "x" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let registered = store_for(&server);
        registered.register(&creds("a@b.com")).await.expect("register should succeed");

        let logged_in = store_for(&server);
        logged_in.login(&creds("a@b.com")).await.expect("login should succeed");

        assert_eq!(registered.snapshot(), logged_in.snapshot());
        assert_eq!(registered.api().authorization(), logged_in.api().authorization());
    }

    #[tokio::test]
    async fn test_register_failure_skips_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(409).set_body_string("email taken"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t" })))
            .expect(0)
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.register(&creds("a@b.com")).await.expect_err("register should fail");

        assert!(matches!(err, AuthError::Registration { kind: FailureKind::Rejected, .. }));
        assert!(!store.is_authenticated());
        assert_eq!(store.error_message(), REGISTRATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_register_then_failed_login_reports_login_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/user"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.register(&creds("a@b.com")).await.expect_err("login step should fail");

        assert!(matches!(err, AuthError::Login { .. }));
        assert_eq!(store.error_message(), LOGIN_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_newest_login_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "slow@b.com", "password": "x" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "token": "old" }))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;
        mount_login(&server, "fast@b.com", "new").await;

        let store = store_for(&server);
        let slow = creds("slow@b.com");
        let fast = creds("fast@b.com");

        let (first, second) = tokio::join!(store.login(&slow), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.login(&fast).await
        });

        assert!(matches!(first, Err(AuthError::Superseded)));
        assert!(second.is_ok());
        assert!(store.is_authenticated());
        assert_eq!(store.api().authorization().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_logout_during_login_wins() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "token": "late" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let store = store_for(&server);
        let credentials = creds("a@b.com");
        let (result, ()) = tokio::join!(store.login(&credentials), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            store.logout();
        });

        assert!(matches!(result, Err(AuthError::Superseded)));
        assert!(!store.is_authenticated());
        assert!(store.api().authorization().is_none());
    }

    #[tokio::test]
    async fn test_stores_are_isolated() {
        let server = MockServer::start().await;
        mount_login(&server, "a@b.com", "abc123").await;

        let first = store_for(&server);
        let second = store_for(&server);
        first.login(&creds("a@b.com")).await.expect("login should succeed");

        assert!(first.is_authenticated());
        assert!(!second.is_authenticated());
        assert!(second.api().authorization().is_none());

        // Clones share state
        let handle = first.clone();
        handle.logout();
        assert!(!first.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let server = MockServer::start().await;
        mount_login(&server, "a@b.com", "abc123").await;

        let store = store_for(&server);
        let mut rx = store.subscribe();

        store.login(&creds("a@b.com")).await.expect("login should succeed");
        assert!(rx.has_changed().expect("sender alive"));
        assert!(rx.borrow_and_update().is_authenticated);

        store.logout();
        assert!(!rx.borrow_and_update().is_authenticated);
    }
}
