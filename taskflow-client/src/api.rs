//! # API client
//!
//! `TaskFlowApi` is the seam every view controller talks through;
//! `TaskFlowClient` is the `reqwest` implementation against the REST
//! backend.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    config::ClientConfig,
    filters::TaskListQuery,
    models::{
        ApiResponse, AuthData, Category, CategoryDraft, ChangePasswordRequest, DashboardData, Id,
        LoginRequest, ProfileUpdate, RegisterRequest, Task, TaskDraft, TaskList, TaskPatch, User,
        VerifyData,
    },
};
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};

/// Operations the client needs from the backend.
///
/// Authenticated calls attach the token last passed to [`set_token`]
/// and fail with [`ApiError::Unauthorized`] when there is none.
///
/// [`set_token`]: TaskFlowApi::set_token
#[async_trait]
pub trait TaskFlowApi: Send + Sync {
    /// Replace the bearer token used by authenticated calls.
    fn set_token(&self, token: Option<String>);

    /// Bearer token currently attached to authenticated calls.
    fn current_token(&self) -> Option<String>;

    /// Check a stored token and fetch its user.
    async fn verify(&self, token: &str) -> ApiResult<ApiResponse<VerifyData>>;

    /// Exchange credentials for a token.
    async fn login(&self, request: &LoginRequest) -> ApiResult<ApiResponse<AuthData>>;

    /// Create an account and sign in.
    async fn register(&self, request: &RegisterRequest) -> ApiResult<ApiResponse<AuthData>>;

    /// List tasks matching `query`.
    async fn list_tasks(&self, query: &TaskListQuery) -> ApiResult<ApiResponse<TaskList>>;

    /// Fetch one task.
    async fn get_task(&self, id: Id) -> ApiResult<ApiResponse<Task>>;

    /// Create a task.
    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<ApiResponse<Task>>;

    /// Update the present fields of a task.
    async fn update_task(&self, id: Id, patch: &TaskPatch) -> ApiResult<ApiResponse<Task>>;

    /// Delete a task.
    async fn delete_task(&self, id: Id) -> ApiResult<ApiResponse<Value>>;

    /// List the user's and the default categories.
    async fn list_categories(&self) -> ApiResult<ApiResponse<Vec<Category>>>;

    /// Create a category.
    async fn create_category(&self, draft: &CategoryDraft) -> ApiResult<ApiResponse<Category>>;

    /// Update a category.
    async fn update_category(
        &self,
        id: Id,
        draft: &CategoryDraft,
    ) -> ApiResult<ApiResponse<Category>>;

    /// Delete a category.
    async fn delete_category(&self, id: Id) -> ApiResult<ApiResponse<Value>>;

    /// Dashboard statistics and task excerpts.
    async fn dashboard(&self) -> ApiResult<ApiResponse<DashboardData>>;

    /// Update name, email and avatar.
    async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<ApiResponse<User>>;

    /// Change the account password.
    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ApiResult<ApiResponse<Value>>;
}

/// `reqwest` client for the `TaskFlow` REST API.
#[derive(Clone, Debug)]
pub struct TaskFlowClient {
    base_url: String,
    client: Client,
    token: Arc<Mutex<Option<String>>>,
}

impl TaskFlowClient {
    /// Create a client for `base_url` (e.g. `http://localhost:5000/api`).
    ///
    /// # Errors
    /// Returns an error when the URL does not parse or the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_client(base_url, Client::builder().user_agent("taskflow-client").build()?)
    }

    /// Create a client from resolved configuration.
    ///
    /// # Errors
    /// Returns an error when the URL does not parse or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ClientConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent("taskflow-client")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Self::with_client(&config.api_base_url, client)
    }

    fn with_client(base_url: &str, client: Client) -> ApiResult<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: Arc::new(Mutex::new(None)),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn public(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.api_url(path))
    }

    fn authorized(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        let token = self.current_token().ok_or_else(ApiError::missing_token)?;
        Ok(self
            .public(method, path)
            .header(AUTHORIZATION, format!("Bearer {token}")))
    }

    async fn execute<T>(&self, builder: RequestBuilder) -> ApiResult<ApiResponse<T>>
    where
        T: DeserializeOwned,
    {
        let request = builder.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        debug!(%method, %path, "sending API request");

        let response = self.client.execute(request).await.inspect_err(|err| {
            warn!(%method, %path, error = %err, "API request failed to complete");
        })?;

        decode_response(response).await.inspect_err(|err| {
            warn!(%method, %path, error = %err, "API request rejected");
        })
    }
}

async fn decode_response<T>(response: Response) -> ApiResult<ApiResponse<T>>
where
    T: DeserializeOwned,
{
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        if body.trim().is_empty() {
            return Ok(ApiResponse {
                success: true,
                data: None,
                message: None,
            });
        }
        return Ok(serde_json::from_str(&body)?);
    }

    let message = serde_json::from_str::<ApiResponse<Value>>(&body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.trim().is_empty());
    Err(ApiError::from_status(status, message))
}

#[async_trait]
impl TaskFlowApi for TaskFlowClient {
    fn set_token(&self, token: Option<String>) {
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn current_token(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn verify(&self, token: &str) -> ApiResult<ApiResponse<VerifyData>> {
        let request = self
            .public(Method::GET, "auth/verify")
            .header(AUTHORIZATION, format!("Bearer {token}"));
        self.execute(request).await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<ApiResponse<AuthData>> {
        self.execute(self.public(Method::POST, "auth/login").json(request))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<ApiResponse<AuthData>> {
        self.execute(self.public(Method::POST, "auth/register").json(request))
            .await
    }

    async fn list_tasks(&self, query: &TaskListQuery) -> ApiResult<ApiResponse<TaskList>> {
        let request = self.authorized(Method::GET, "tasks")?.query(query);
        self.execute(request).await
    }

    async fn get_task(&self, id: Id) -> ApiResult<ApiResponse<Task>> {
        self.execute(self.authorized(Method::GET, &format!("tasks/{id}"))?)
            .await
    }

    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<ApiResponse<Task>> {
        self.execute(self.authorized(Method::POST, "tasks")?.json(draft))
            .await
    }

    async fn update_task(&self, id: Id, patch: &TaskPatch) -> ApiResult<ApiResponse<Task>> {
        let request = self
            .authorized(Method::PUT, &format!("tasks/{id}"))?
            .json(patch);
        self.execute(request).await
    }

    async fn delete_task(&self, id: Id) -> ApiResult<ApiResponse<Value>> {
        self.execute(self.authorized(Method::DELETE, &format!("tasks/{id}"))?)
            .await
    }

    async fn list_categories(&self) -> ApiResult<ApiResponse<Vec<Category>>> {
        self.execute(self.authorized(Method::GET, "categories")?)
            .await
    }

    async fn create_category(&self, draft: &CategoryDraft) -> ApiResult<ApiResponse<Category>> {
        self.execute(self.authorized(Method::POST, "categories")?.json(draft))
            .await
    }

    async fn update_category(
        &self,
        id: Id,
        draft: &CategoryDraft,
    ) -> ApiResult<ApiResponse<Category>> {
        let request = self
            .authorized(Method::PUT, &format!("categories/{id}"))?
            .json(draft);
        self.execute(request).await
    }

    async fn delete_category(&self, id: Id) -> ApiResult<ApiResponse<Value>> {
        self.execute(self.authorized(Method::DELETE, &format!("categories/{id}"))?)
            .await
    }

    async fn dashboard(&self) -> ApiResult<ApiResponse<DashboardData>> {
        self.execute(self.authorized(Method::GET, "users/dashboard")?)
            .await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<ApiResponse<User>> {
        self.execute(self.authorized(Method::PUT, "users/profile")?.json(update))
            .await
    }

    async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ApiResult<ApiResponse<Value>> {
        self.execute(self.authorized(Method::PUT, "users/password")?.json(request))
            .await
    }
}
