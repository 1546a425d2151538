//! Login state.
//!
//! A session is a user record plus bearer token obtained from the API. It is
//! stored under [`keys::CURRENT_USER`] (JSON) and [`keys::TOKEN`] (raw) and
//! loaded back at startup. Validity is never checked locally: an expired
//! token only shows up as a rejected request later on.

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::instrument;

use crate::api::{ApiClient, ApiError, Registration, User};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::store::{PersistentStore, StoreError, keys};

const EVENT_CAPACITY: usize = 16;

pub const LOGIN_SUCCESSFUL: &str = "Login successful";
pub const LOGIN_FAILED: &str = "Login failed";
pub const REGISTRATION_SUCCESSFUL: &str = "Registration successful";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const NETWORK_ERROR: &str = "Network error. Please try again.";

/// Result of a login or registration attempt, ready to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Succeeded(String),
    Failed(String),
}

impl AuthOutcome {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Succeeded(message) | Self::Failed(message) => message,
        }
    }

    /// Map an API failure to a user-facing message.
    ///
    /// Server rejections show the server's `detail` when it sent one;
    /// anything that kept the request from completing is a network error.
    fn from_error(error: &ApiError, fallback: &str) -> Self {
        let message = match error {
            ApiError::Rejected { message, .. } => {
                message.clone().unwrap_or_else(|| fallback.to_string())
            }
            ApiError::Transport(_) | ApiError::Decode(_) => NETWORK_ERROR.to_string(),
        };
        Self::Failed(message)
    }
}

/// The logged-in user and their token.
pub struct UserSession {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for UserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserSession")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Published after the session changed and was persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    LoggedIn(User),
    LoggedOut,
}

/// Current login state and the operations that change it.
#[derive(Debug)]
pub struct AuthSession {
    store: PersistentStore,
    api: ApiClient,
    current: Option<UserSession>,
    events: broadcast::Sender<AuthEvent>,
}

impl AuthSession {
    /// Load the session saved in `store`.
    ///
    /// The session is present only when both the user record and the token
    /// are. An unreadable user record counts as logged out.
    #[must_use]
    pub fn load(store: PersistentStore, api: ApiClient) -> Self {
        let user = store.get_json::<User>(keys::CURRENT_USER).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved user is unreadable, starting logged out");
            None
        });
        let token = store.get_raw(keys::TOKEN).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Saved token is unreadable, starting logged out");
            None
        });

        let current = match (user, token) {
            (Some(user), Some(token)) => Some(UserSession {
                user,
                token: SecretString::from(token),
            }),
            _ => None,
        };

        if let Some(session) = &current {
            set_sentry_user(session.user.id.as_ref(), Some(session.user.email.as_str()));
        }

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            api,
            current,
            events,
        }
    }

    /// Subscribe to login/logout notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Log in and remember the session.
    ///
    /// On failure the previous session, if any, is kept.
    #[instrument(skip(self, password))]
    pub async fn login(&mut self, email: &str, password: &SecretString) -> AuthOutcome {
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                tracing::info!(error = %e, "Login failed");
                return AuthOutcome::from_error(&e, LOGIN_FAILED);
            }
        };

        if let Err(e) = self.persist(&response.user, &response.token) {
            tracing::error!(error = %e, "Failed to persist session, clearing saved session");
            self.forget_saved();
        }

        set_sentry_user(response.user.id.as_ref(), Some(response.user.email.as_str()));
        add_breadcrumb("auth", "Logged in", None);
        tracing::info!(user = %response.user.email, "Logged in");

        let user = response.user.clone();
        self.current = Some(UserSession {
            user: response.user,
            token: response.token,
        });
        let _ = self.events.send(AuthEvent::LoggedIn(user));

        AuthOutcome::Succeeded(LOGIN_SUCCESSFUL.to_string())
    }

    /// Create an account. The session is not touched; log in afterwards.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> AuthOutcome {
        match self.api.register(registration).await {
            Ok(_) => {
                add_breadcrumb("auth", "Registered", None);
                AuthOutcome::Succeeded(REGISTRATION_SUCCESSFUL.to_string())
            }
            Err(e) => {
                tracing::info!(error = %e, "Registration failed");
                AuthOutcome::from_error(&e, REGISTRATION_FAILED)
            }
        }
    }

    /// Forget the session, in memory and in the store.
    pub fn logout(&mut self) {
        self.current = None;
        self.forget_saved();

        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);
        let _ = self.events.send(AuthEvent::LoggedOut);
    }

    /// Save user and token. The pair is only valid when both writes land.
    fn persist(&self, user: &User, token: &SecretString) -> Result<(), StoreError> {
        self.store.set_json(keys::CURRENT_USER, user)?;
        self.store.set_raw(keys::TOKEN, token.expose_secret())
    }

    fn forget_saved(&self) {
        if let Err(e) = self.store.remove(keys::CURRENT_USER) {
            tracing::error!(error = %e, "Failed to remove saved user");
        }
        if let Err(e) = self.store.remove(keys::TOKEN) {
            tracing::error!(error = %e, "Failed to remove saved token");
        }
    }

    #[must_use]
    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    #[must_use]
    pub fn token(&self) -> Option<&SecretString> {
        self.current.as_ref().map(|s| &s.token)
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub const fn session(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use crate::testing::{serve, unreachable_config};

    fn auth_router() -> Router {
        Router::new()
            .route(
                "/api/auth/login",
                post(|Json(body): Json<Value>| async move {
                    if body["password"] == "correct" {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "user": {"id": 5, "name": "Nadia", "email": body["email"]},
                                "token": "tok-5"
                            })),
                        )
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Incorrect email or password"})),
                        )
                    }
                }),
            )
            .route(
                "/api/auth/register",
                post(|Json(body): Json<Value>| async move {
                    if body["email"] == "taken@example.com" {
                        (StatusCode::BAD_REQUEST, Json(json!({"detail": "Email already registered"})))
                    } else {
                        (StatusCode::OK, Json(json!({"message": "User created successfully"})))
                    }
                }),
            )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            name: "Nadia".to_string(),
            email: email.parse().unwrap(),
            password: SecretString::from("correct"),
            phone: "+8801700000000".to_string(),
            address: "Dhaka".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let api = ApiClient::new(&serve(auth_router()).await);
        let store = PersistentStore::in_memory();
        let mut session = AuthSession::load(store.clone(), api.clone());
        let mut events = session.subscribe();

        let outcome = session
            .login("nadia@example.com", &SecretString::from("correct"))
            .await;
        assert_eq!(outcome, AuthOutcome::Succeeded("Login successful".to_string()));
        assert!(session.is_authenticated());
        assert_eq!(session.current_user().unwrap().name, "Nadia");
        assert_eq!(store.get_raw(keys::TOKEN).unwrap().as_deref(), Some("tok-5"));
        assert!(matches!(events.recv().await.unwrap(), AuthEvent::LoggedIn(_)));

        let restored = AuthSession::load(store, api);
        assert_eq!(restored.token().unwrap().expose_secret(), "tok-5");
        assert_eq!(restored.current_user().unwrap().id.unwrap().as_i32(), 5);
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_previous_session() {
        let api = ApiClient::new(&serve(auth_router()).await);
        let mut session = AuthSession::load(PersistentStore::in_memory(), api);
        session
            .login("nadia@example.com", &SecretString::from("correct"))
            .await;

        let outcome = session
            .login("other@example.com", &SecretString::from("wrong"))
            .await;
        assert_eq!(
            outcome,
            AuthOutcome::Failed("Incorrect email or password".to_string())
        );
        assert_eq!(
            session.current_user().unwrap().email.as_str(),
            "nadia@example.com"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        let api = ApiClient::new(&unreachable_config().await);
        let mut session = AuthSession::load(PersistentStore::in_memory(), api);

        let outcome = session.login("a@example.com", &SecretString::from("x")).await;
        assert_eq!(outcome.message(), NETWORK_ERROR);
        assert!(!outcome.is_success());
        assert!(!session.is_authenticated());

        let outcome = session.register(&registration("a@example.com")).await;
        assert_eq!(outcome, AuthOutcome::Failed(NETWORK_ERROR.to_string()));
    }

    #[tokio::test]
    async fn test_unreachable_api_keeps_saved_session() {
        let store = PersistentStore::in_memory();
        store
            .set_json(keys::CURRENT_USER, &json!({"id": 1, "name": "Alice", "email": "alice@example.com"}))
            .unwrap();
        store.set_raw(keys::TOKEN, "tok-A").unwrap();

        let api = ApiClient::new(&unreachable_config().await);
        let mut session = AuthSession::load(store.clone(), api);
        let outcome = session.login("bob@example.com", &SecretString::from("x")).await;

        assert_eq!(outcome, AuthOutcome::Failed(NETWORK_ERROR.to_string()));
        assert_eq!(session.current_user().unwrap().name, "Alice");
        assert_eq!(session.token().unwrap().expose_secret(), "tok-A");
        assert_eq!(store.get_raw(keys::TOKEN).unwrap().as_deref(), Some("tok-A"));
        let saved: User = store.get_json(keys::CURRENT_USER).unwrap().unwrap();
        assert_eq!(saved.name, "Alice");
    }

    /// Accepts every write except to the token key.
    #[derive(Default)]
    struct TokenWritesFail(MemoryStore);

    impl KeyValueStore for TokenWritesFail {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
            if key == keys::TOKEN {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.0.remove(key)
        }
    }

    #[tokio::test]
    async fn test_partial_save_never_mixes_users() {
        let backend = TokenWritesFail::default();
        backend
            .0
            .set(
                keys::CURRENT_USER,
                json!({"id": 1, "name": "Alice", "email": "alice@example.com"}).to_string(),
            )
            .unwrap();
        backend.0.set(keys::TOKEN, "tok-A".to_string()).unwrap();
        let store = PersistentStore::new(backend);

        let api = ApiClient::new(&serve(auth_router()).await);
        let mut session = AuthSession::load(store.clone(), api.clone());
        assert_eq!(session.current_user().unwrap().name, "Alice");

        let outcome = session
            .login("nadia@example.com", &SecretString::from("correct"))
            .await;
        assert!(outcome.is_success());
        assert_eq!(session.current_user().unwrap().name, "Nadia");

        // Neither half of either session is left behind.
        assert_eq!(store.get_raw(keys::CURRENT_USER).unwrap(), None);
        assert_eq!(store.get_raw(keys::TOKEN).unwrap(), None);
        assert!(!AuthSession::load(store, api).is_authenticated());
    }

    #[tokio::test]
    async fn test_register_does_not_log_in() {
        let api = ApiClient::new(&serve(auth_router()).await);
        let session = AuthSession::load(PersistentStore::in_memory(), api);

        let outcome = session.register(&registration("new@example.com")).await;
        assert_eq!(outcome.message(), REGISTRATION_SUCCESSFUL);
        assert!(!session.is_authenticated());

        let outcome = session.register(&registration("taken@example.com")).await;
        assert_eq!(outcome, AuthOutcome::Failed("Email already registered".to_string()));
    }

    #[tokio::test]
    async fn test_logout_clears_store() {
        let api = ApiClient::new(&serve(auth_router()).await);
        let store = PersistentStore::in_memory();
        let mut session = AuthSession::load(store.clone(), api);
        session
            .login("nadia@example.com", &SecretString::from("correct"))
            .await;

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(store.get_raw(keys::TOKEN).unwrap(), None);
        assert_eq!(store.get_raw(keys::CURRENT_USER).unwrap(), None);

        // Logging out twice is harmless.
        session.logout();
    }

    #[test]
    fn test_rejection_without_detail_uses_fallback() {
        let error = ApiError::Rejected {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: None,
        };
        assert_eq!(
            AuthOutcome::from_error(&error, LOGIN_FAILED),
            AuthOutcome::Failed("Login failed".to_string())
        );
        let error = ApiError::Decode("expected value".to_string());
        assert_eq!(AuthOutcome::from_error(&error, LOGIN_FAILED).message(), NETWORK_ERROR);
    }

    #[test]
    fn test_token_without_user_is_logged_out() {
        let store = PersistentStore::in_memory();
        store.set_raw(keys::TOKEN, "orphan").unwrap();
        let api = ApiClient::new(&crate::config::ClientConfig::default());
        let session = AuthSession::load(store, api);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_corrupt_user_is_logged_out() {
        let store = PersistentStore::in_memory();
        store.set_raw(keys::TOKEN, "tok").unwrap();
        store.set_raw(keys::CURRENT_USER, "{\"name\":").unwrap();
        let api = ApiClient::new(&crate::config::ClientConfig::default());
        let session = AuthSession::load(store, api);
        assert!(session.current_user().is_none());
    }
}
