//! Application context built once at startup and handed to every view.

use std::{fmt, sync::Arc};

use shared::{config::ClientConfig, models::User};
use thiserror::Error;
use tracing::debug;

use crate::{
    api::{TaskFlowApi, TaskFlowClient},
    error::{ApiError, ApiResult},
    notify::Notifier,
    session::{SessionStatus, SessionStore},
    storage::{FileTokenStore, TokenStore},
};

/// Returned by [`AppContext::require_user`] when nobody is logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("not logged in")]
pub struct NotAuthenticated;

/// API client, session and notification sink shared by all views.
#[derive(Clone)]
pub struct AppContext {
    api: Arc<dyn TaskFlowApi>,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wire the collaborators and settle the session from the stored token.
    pub async fn bootstrap(
        api: Arc<dyn TaskFlowApi>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = SessionStore::new(api.clone(), tokens, notifier.clone());
        let status = session.initialize().await;
        debug!(?status, "application context ready");
        Self {
            api,
            session,
            notifier,
        }
    }

    /// Production wiring: HTTP client and file token store from `config`.
    ///
    /// # Errors
    /// Returns an error when the configured API URL is unusable.
    pub async fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> ApiResult<Self> {
        let api = Arc::new(TaskFlowClient::from_config(config)?);
        let tokens = Arc::new(FileTokenStore::new(config.resolved_token_path()));
        Ok(Self::bootstrap(api, tokens, notifier).await)
    }

    /// Auth gate for every view except login and register.
    ///
    /// # Errors
    /// Returns [`NotAuthenticated`] unless the session is authenticated.
    pub fn require_user(&self) -> Result<User, NotAuthenticated> {
        match self.session.status() {
            SessionStatus::Authenticated => self.session.current_user().ok_or(NotAuthenticated),
            SessionStatus::Initializing | SessionStatus::Anonymous => Err(NotAuthenticated),
        }
    }

    /// Backend client.
    #[must_use]
    pub fn api(&self) -> &Arc<dyn TaskFlowApi> {
        &self.api
    }

    /// Session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Notification sink.
    #[must_use]
    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    /// Report a failed call: auth failures end the session, anything else
    /// shows the backend message or `fallback`.
    pub(crate) fn report_error(&self, err: &ApiError, fallback: &str) {
        if !self.session.handle_api_error(err) {
            self.notifier.error(&err.display_message(fallback));
        }
    }
}
