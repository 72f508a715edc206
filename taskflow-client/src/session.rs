//! # Session store
//!
//! Single source of truth for who is logged in. The bearer token is the
//! only persisted field; the user is derived from it through `verify`,
//! `login` or `register` and kept in memory.

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use shared::models::{ApiResponse, AuthData, LoginRequest, RegisterRequest, User, UserPatch};
use tracing::{debug, info, warn};

use crate::{
    api::TaskFlowApi,
    error::{ApiError, ApiResult},
    notify::Notifier,
    storage::TokenStore,
};

pub(crate) const LOGIN_SUCCESS: &str = "Welcome back!";
pub(crate) const REGISTER_SUCCESS: &str = "Account created successfully!";
pub(crate) const LOGOUT_SUCCESS: &str = "Logged out successfully";
pub(crate) const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";
const LOGIN_FAILED: &str = "Login failed";
const REGISTER_FAILED: &str = "Registration failed";

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// A stored token is being verified.
    Initializing,
    /// Nobody is logged in.
    Anonymous,
    /// A verified user is logged in.
    Authenticated,
}

/// Point-in-time copy of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Lifecycle state.
    pub status: SessionStatus,
    /// Logged in user; `Some` only while `Authenticated`.
    pub user: Option<User>,
    /// Bearer token; `Some` only while `Authenticated`.
    pub token: Option<String>,
    /// A verify, login or register round trip is in flight.
    pub loading: bool,
}

impl Session {
    fn initial() -> Self {
        Self {
            status: SessionStatus::Initializing,
            user: None,
            token: None,
            loading: true,
        }
    }
}

/// Result of `login`/`register`. Failures never escape as errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Whether the session is now authenticated.
    pub success: bool,
    /// Text shown to the user.
    pub message: String,
}

impl AuthOutcome {
    fn succeeded(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Shared handle to the session. Clones observe the same state.
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<dyn TaskFlowApi>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    state: Arc<Mutex<Session>>,
    // Login/register calls awaiting a response. Only changed under `state`.
    auth_in_flight: Arc<AtomicUsize>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.state();
        f.debug_struct("SessionStore")
            .field("status", &session.status)
            .field("user", &session.user.as_ref().map(|user| &user.email))
            .field("loading", &session.loading)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// New store in the `Initializing` state. Call [`initialize`] next.
    ///
    /// [`initialize`]: SessionStore::initialize
    pub fn new(
        api: Arc<dyn TaskFlowApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            tokens,
            notifier,
            state: Arc::new(Mutex::new(Session::initial())),
            auth_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn state(&self) -> MutexGuard<'_, Session> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Verify the stored token, if any, and settle on `Authenticated` or
    /// `Anonymous`. Any verification failure clears the stored token.
    pub async fn initialize(&self) -> SessionStatus {
        {
            let mut state = self.state();
            *state = Session::initial();
        }

        let stored = self.tokens.load().unwrap_or_else(|err| {
            warn!(error = %err, "could not read stored token");
            None
        });
        let Some(token) = stored else {
            debug!("no stored token");
            self.become_anonymous();
            return SessionStatus::Anonymous;
        };

        let verified = match self.api.verify(&token).await {
            Ok(response) => response.into_data().map(|data| data.user),
            Err(err) => {
                warn!(error = %err, "stored token failed verification");
                None
            }
        };

        match verified {
            Some(user) => {
                info!(user_id = user.id, "restored session");
                self.become_authenticated(token, user);
                SessionStatus::Authenticated
            }
            None => {
                self.discard_token();
                self.become_anonymous();
                SessionStatus::Anonymous
            }
        }
    }

    /// Exchange credentials for a session.
    ///
    /// Concurrent calls are not deduplicated; the last to resolve wins.
    pub async fn login(&self, email: &str, password: &str) -> AuthOutcome {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.begin_auth();
        let result = self.api.login(&request).await;
        self.finish_auth(result, LOGIN_SUCCESS, LOGIN_FAILED)
    }

    /// Create an account and log into it.
    ///
    /// Concurrent calls are not deduplicated; the last to resolve wins.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> AuthOutcome {
        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        self.begin_auth();
        let result = self.api.register(&request).await;
        self.finish_auth(result, REGISTER_SUCCESS, REGISTER_FAILED)
    }

    fn finish_auth(
        &self,
        result: ApiResult<ApiResponse<AuthData>>,
        success: &str,
        fallback: &str,
    ) -> AuthOutcome {
        self.end_auth();
        let outcome = match result {
            Ok(response) if response.success => match response.data {
                Some(AuthData { token, user }) if !token.trim().is_empty() => {
                    self.adopt(token, user, success)
                }
                _ => AuthOutcome::failed(fallback),
            },
            Ok(response) => AuthOutcome::failed(response.message_or(fallback)),
            Err(err) => {
                warn!(error = %err, "authentication request failed");
                AuthOutcome::failed(err.display_message(fallback))
            }
        };

        if outcome.success {
            self.notifier.success(&outcome.message);
        } else {
            self.notifier.error(&outcome.message);
        }
        outcome
    }

    fn adopt(&self, token: String, user: User, success: &str) -> AuthOutcome {
        if let Err(err) = self.tokens.save(&token) {
            warn!(error = %err, "could not persist session token");
            return AuthOutcome::failed(format!("Could not save session: {err}"));
        }
        info!(user_id = user.id, "logged in");
        self.become_authenticated(token, user);
        AuthOutcome::succeeded(success)
    }

    /// End the session regardless of its current state.
    pub fn logout(&self) {
        self.discard_token();
        self.become_anonymous();
        info!("logged out");
        self.notifier.success(LOGOUT_SUCCESS);
    }

    /// Merge `patch` into the cached user without a round trip.
    ///
    /// Returns the updated user, or `None` when nobody is logged in.
    pub fn update_user(&self, patch: &UserPatch) -> Option<User> {
        let mut state = self.state();
        let user = state.user.as_mut()?;
        user.apply(patch);
        Some(user.clone())
    }

    /// Clear the session when `err` means the token is missing or rejected.
    ///
    /// Returns `true` when the error was an auth failure; the session is
    /// `Anonymous` afterwards.
    pub fn handle_api_error(&self, err: &ApiError) -> bool {
        if !err.is_auth_failure() {
            return false;
        }
        let was_authenticated = self.is_authenticated();
        self.discard_token();
        self.become_anonymous();
        if was_authenticated {
            warn!(error = %err, "session rejected by backend");
            self.notifier.error(SESSION_EXPIRED);
        }
        true
    }

    /// Logged in user, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.state().user.clone()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state().status
    }

    /// Whether a verified user is logged in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    /// Whether an auth round trip is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    /// Copy of the whole session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state().clone()
    }

    fn begin_auth(&self) {
        let mut state = self.state();
        self.auth_in_flight.fetch_add(1, Ordering::SeqCst);
        state.loading = true;
    }

    fn end_auth(&self) {
        let mut state = self.state();
        let remaining = self
            .auth_in_flight
            .fetch_sub(1, Ordering::SeqCst)
            .saturating_sub(1);
        state.loading = remaining > 0;
    }

    fn become_authenticated(&self, token: String, user: User) {
        self.api.set_token(Some(token.clone()));
        let mut state = self.state();
        *state = Session {
            status: SessionStatus::Authenticated,
            user: Some(user),
            token: Some(token),
            loading: self.auth_in_flight.load(Ordering::SeqCst) > 0,
        };
    }

    fn become_anonymous(&self) {
        self.api.set_token(None);
        let mut state = self.state();
        *state = Session {
            status: SessionStatus::Anonymous,
            user: None,
            token: None,
            loading: self.auth_in_flight.load(Ordering::SeqCst) > 0,
        };
    }

    fn discard_token(&self) {
        if let Err(err) = self.tokens.clear() {
            warn!(error = %err, "could not remove stored token");
        }
    }
}
