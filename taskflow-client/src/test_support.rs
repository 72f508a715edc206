//! Scripted in-memory backend for controller tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use shared::{
    filters::TaskListQuery,
    models::{
        ApiResponse, AuthData, Category, CategoryDraft, ChangePasswordRequest, DashboardData, Id,
        LoginRequest, ProfileUpdate, RegisterRequest, Task, TaskDraft, TaskList, TaskPatch,
        TaskPriority, TaskStatus, User, VerifyData,
    },
};
use tokio::sync::oneshot;

use crate::{
    api::TaskFlowApi,
    context::AppContext,
    error::{ApiError, ApiResult},
    notify::RecordingNotifier,
    storage::MemoryTokenStore,
};

type Reply<T> = ApiResult<ApiResponse<T>>;

enum Step<T> {
    Ready(Reply<T>),
    Gated(oneshot::Receiver<Reply<T>>),
}

/// Queue of replies for one endpoint, consumed in call order.
pub(crate) struct Script<T> {
    steps: Mutex<VecDeque<Step<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    fn push(&self, step: Step<T>) {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(step);
    }

    pub(crate) fn push_ok(&self, data: T) {
        self.push(Step::Ready(Ok(ApiResponse::ok(data))));
    }

    pub(crate) fn push_failure(&self, message: &str) {
        self.push(Step::Ready(Ok(ApiResponse::failure(message))));
    }

    pub(crate) fn push_err(&self, err: ApiError) {
        self.push(Step::Ready(Err(err)));
    }

    /// Reply that resolves only when the returned sender fires.
    pub(crate) fn gate(&self) -> oneshot::Sender<Reply<T>> {
        let (tx, rx) = oneshot::channel();
        self.push(Step::Gated(rx));
        tx
    }

    async fn next(&self) -> Reply<T> {
        let step = self
            .steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        match step {
            Some(Step::Ready(reply)) => reply,
            Some(Step::Gated(rx)) => rx.await.unwrap_or_else(|_| Err(unscripted())),
            None => Err(unscripted()),
        }
    }
}

fn unscripted() -> ApiError {
    ApiError::from_status(
        StatusCode::NOT_IMPLEMENTED,
        Some("unscripted call".to_string()),
    )
}

/// In-memory [`TaskFlowApi`] with one script per endpoint.
#[derive(Default)]
pub(crate) struct FakeApi {
    token: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
    queries: Mutex<Vec<TaskListQuery>>,
    patches: Mutex<Vec<(Id, TaskPatch)>>,
    pub(crate) verify: Script<VerifyData>,
    pub(crate) login: Script<AuthData>,
    pub(crate) register: Script<AuthData>,
    pub(crate) list_tasks: Script<TaskList>,
    pub(crate) get_task: Script<Task>,
    pub(crate) create_task: Script<Task>,
    pub(crate) update_task: Script<Task>,
    pub(crate) delete_task: Script<Value>,
    pub(crate) list_categories: Script<Vec<Category>>,
    pub(crate) create_category: Script<Category>,
    pub(crate) update_category: Script<Category>,
    pub(crate) delete_category: Script<Value>,
    pub(crate) dashboard: Script<DashboardData>,
    pub(crate) update_profile: Script<User>,
    pub(crate) change_password: Script<Value>,
}

impl FakeApi {
    /// Calls in the order they were made.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Queries sent to `list_tasks`.
    pub(crate) fn queries(&self) -> Vec<TaskListQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Patches sent to `update_task`.
    pub(crate) fn patches(&self) -> Vec<(Id, TaskPatch)> {
        self.patches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, call: String) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    fn require_token(&self) -> ApiResult<()> {
        if self.current_token().is_some() {
            Ok(())
        } else {
            Err(ApiError::missing_token())
        }
    }
}

#[async_trait]
impl TaskFlowApi for FakeApi {
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
        self.record(format!("verify {token}"));
        self.verify.next().await
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<ApiResponse<AuthData>> {
        self.record(format!("login {}", request.email));
        self.login.next().await
    }

    async fn register(&self, request: &RegisterRequest) -> ApiResult<ApiResponse<AuthData>> {
        self.record(format!("register {}", request.email));
        self.register.next().await
    }

    async fn list_tasks(&self, query: &TaskListQuery) -> ApiResult<ApiResponse<TaskList>> {
        self.require_token()?;
        self.record("list_tasks".to_string());
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());
        self.list_tasks.next().await
    }

    async fn get_task(&self, id: Id) -> ApiResult<ApiResponse<Task>> {
        self.require_token()?;
        self.record(format!("get_task {id}"));
        self.get_task.next().await
    }

    async fn create_task(&self, draft: &TaskDraft) -> ApiResult<ApiResponse<Task>> {
        self.require_token()?;
        self.record(format!("create_task {}", draft.title));
        self.create_task.next().await
    }

    async fn update_task(&self, id: Id, patch: &TaskPatch) -> ApiResult<ApiResponse<Task>> {
        self.require_token()?;
        self.record(format!("update_task {id}"));
        self.patches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, patch.clone()));
        self.update_task.next().await
    }

    async fn delete_task(&self, id: Id) -> ApiResult<ApiResponse<Value>> {
        self.require_token()?;
        self.record(format!("delete_task {id}"));
        self.delete_task.next().await
    }

    async fn list_categories(&self) -> ApiResult<ApiResponse<Vec<Category>>> {
        self.require_token()?;
        self.record("list_categories".to_string());
        self.list_categories.next().await
    }

    async fn create_category(&self, draft: &CategoryDraft) -> ApiResult<ApiResponse<Category>> {
        self.require_token()?;
        self.record(format!("create_category {}", draft.name));
        self.create_category.next().await
    }

    async fn update_category(
        &self,
        id: Id,
        _draft: &CategoryDraft,
    ) -> ApiResult<ApiResponse<Category>> {
        self.require_token()?;
        self.record(format!("update_category {id}"));
        self.update_category.next().await
    }

    async fn delete_category(&self, id: Id) -> ApiResult<ApiResponse<Value>> {
        self.require_token()?;
        self.record(format!("delete_category {id}"));
        self.delete_category.next().await
    }

    async fn dashboard(&self) -> ApiResult<ApiResponse<DashboardData>> {
        self.require_token()?;
        self.record("dashboard".to_string());
        self.dashboard.next().await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<ApiResponse<User>> {
        self.require_token()?;
        self.record(format!("update_profile {}", update.name));
        self.update_profile.next().await
    }

    async fn change_password(
        &self,
        _request: &ChangePasswordRequest,
    ) -> ApiResult<ApiResponse<Value>> {
        self.require_token()?;
        self.record("change_password".to_string());
        self.change_password.next().await
    }
}

/// Context whose session was restored from a stored token for user 1.
pub(crate) async fn signed_in(api: &Arc<FakeApi>, notifier: &Arc<RecordingNotifier>) -> AppContext {
    api.verify.push_ok(VerifyData {
        user: user(1, "A", "a@x.com"),
    });
    let ctx = AppContext::bootstrap(
        api.clone(),
        Arc::new(MemoryTokenStore::with_token("token")),
        notifier.clone(),
    )
    .await;
    assert!(ctx.session().is_authenticated());
    ctx
}

pub(crate) fn user(id: Id, name: &str, email: &str) -> User {
    User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        avatar_url: None,
        created_at: None,
    }
}

pub(crate) fn task(id: Id, title: &str, status: TaskStatus) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        status,
        priority: TaskPriority::Medium,
        due_date: None,
        category_id: None,
        category_name: None,
        category_color: None,
    }
}

pub(crate) fn task_list(tasks: Vec<Task>) -> TaskList {
    TaskList { tasks }
}

pub(crate) fn category(id: Id, name: &str, user_id: Option<Id>, task_count: u32) -> Category {
    Category {
        id,
        name: name.to_string(),
        color: "#3B82F6".to_string(),
        user_id,
        task_count,
    }
}
