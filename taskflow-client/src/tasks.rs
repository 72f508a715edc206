//! # Task board
//!
//! Holds the filter set and keeps the cached task list consistent with
//! it. Every fetch is tagged with a request id; only the latest issued
//! fetch may write the list, and nothing writes once the view is closed.

use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

use shared::{
    filters::{FilterKey, TaskFilters},
    models::{Category, Id, Task, TaskDraft, TaskPatch, TaskStatus},
    validation::{ValidationErrors, validate_task},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{context::AppContext, error::ApiError};

const RATE_LIMITED: &str = "Too many requests. Please wait a moment and try again.";
const LOAD_FAILED: &str = "Failed to load tasks";
const STATUS_UPDATED: &str = "Task status updated";
const STATUS_FAILED: &str = "Failed to update task status";
const TASK_DELETED: &str = "Task deleted successfully";
const DELETE_FAILED: &str = "Failed to delete task";
const TASK_CREATED: &str = "Task created successfully!";
const TASK_UPDATED: &str = "Task updated successfully!";
const SAVE_FAILED: &str = "Failed to save task";

/// What a fetch did to the cached list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The list was replaced with this many tasks.
    Updated(usize),
    /// The fetch failed; the previous list is unchanged.
    Failed,
    /// A newer fetch was issued first; the response was dropped.
    Stale,
    /// The view was closed; the response was dropped.
    Cancelled,
}

#[derive(Debug, Default)]
struct BoardState {
    filters: TaskFilters,
    tasks: Vec<Task>,
    categories: Vec<Category>,
    loading: bool,
}

/// Task list view: filters, cached tasks and the mutations on them.
#[derive(Debug)]
pub struct TaskBoard {
    ctx: AppContext,
    state: Mutex<BoardState>,
    latest_request: AtomicU64,
    cancel: CancellationToken,
}

impl TaskBoard {
    /// Empty board with no filters. Call [`refresh`] to load it.
    ///
    /// [`refresh`]: TaskBoard::refresh
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self::with_filters(ctx, TaskFilters::default())
    }

    /// Board starting from `filters`.
    #[must_use]
    pub fn with_filters(ctx: AppContext, filters: TaskFilters) -> Self {
        Self {
            ctx,
            state: Mutex::new(BoardState {
                filters,
                ..BoardState::default()
            }),
            latest_request: AtomicU64::new(0),
            cancel: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change one filter and refetch.
    pub async fn set_filter(&self, key: FilterKey, value: impl Into<String>) -> FetchOutcome {
        self.state().filters.set(key, value);
        self.refresh().await
    }

    /// Fetch the tasks matching the current filters.
    pub async fn refresh(&self) -> FetchOutcome {
        let request_id = self.latest_request.fetch_add(1, Ordering::SeqCst) + 1;
        let query = {
            let mut state = self.state();
            state.loading = true;
            state.filters.to_query()
        };
        debug!(request_id, query = ?query.pairs(), "fetching tasks");

        let Some(result) = self
            .cancel
            .run_until_cancelled(self.ctx.api().list_tasks(&query))
            .await
        else {
            debug!(request_id, "task fetch cancelled");
            return FetchOutcome::Cancelled;
        };

        let result = {
            let mut state = self.state();
            if self.cancel.is_cancelled() {
                return FetchOutcome::Cancelled;
            }
            if request_id != self.latest_request.load(Ordering::SeqCst) {
                debug!(request_id, "discarding stale task list");
                return FetchOutcome::Stale;
            }
            state.loading = false;

            match result {
                Ok(response) if response.success => {
                    state.tasks = response.data.map(|list| list.tasks).unwrap_or_default();
                    return FetchOutcome::Updated(state.tasks.len());
                }
                other => other,
            }
        };

        match result {
            Ok(response) => self.ctx.notifier().error(&response.message_or(LOAD_FAILED)),
            Err(err) => self.report_fetch_error(&err),
        }
        FetchOutcome::Failed
    }

    fn report_fetch_error(&self, err: &ApiError) {
        warn!(error = %err, "failed to load tasks");
        if self.ctx.session().handle_api_error(err) {
            return;
        }
        let message = if err.is_rate_limited() {
            RATE_LIMITED.to_string()
        } else {
            format!("{LOAD_FAILED}: {}", err.detail())
        };
        self.ctx.notifier().error(&message);
    }

    /// Load the categories offered by the category filter.
    ///
    /// Failures are logged only.
    pub async fn load_categories(&self) -> bool {
        let Some(result) = self
            .cancel
            .run_until_cancelled(self.ctx.api().list_categories())
            .await
        else {
            return false;
        };

        match result {
            Ok(response) if response.success => {
                if self.cancel.is_cancelled() {
                    return false;
                }
                self.state().categories = response.data.unwrap_or_default();
                true
            }
            Ok(response) => {
                warn!(message = ?response.message, "category options rejected");
                false
            }
            Err(err) => {
                warn!(error = %err, "failed to load category options");
                self.ctx.session().handle_api_error(&err);
                false
            }
        }
    }

    /// Set a task's status; the cached row changes only after the backend
    /// accepts it.
    pub async fn set_status(&self, id: Id, status: TaskStatus) -> bool {
        let patch = TaskPatch::status(status);
        let Some(result) = self
            .cancel
            .run_until_cancelled(self.ctx.api().update_task(id, &patch))
            .await
        else {
            return false;
        };

        match result {
            Ok(response) if response.success => {
                if self.cancel.is_cancelled() {
                    return false;
                }
                if let Some(task) = self.state().tasks.iter_mut().find(|task| task.id == id) {
                    task.status = status;
                }
                info!(task_id = id, status = status.as_str(), "task status updated");
                self.ctx.notifier().success(STATUS_UPDATED);
                true
            }
            Ok(response) => {
                self.ctx
                    .notifier()
                    .error(&response.message_or(STATUS_FAILED));
                false
            }
            Err(err) => {
                warn!(task_id = id, error = %err, "status update failed");
                if !self.ctx.session().handle_api_error(&err) {
                    self.ctx.notifier().error(STATUS_FAILED);
                }
                false
            }
        }
    }

    /// Flip a cached task between completed and pending.
    pub async fn toggle_status(&self, id: Id) -> bool {
        let current = self
            .state()
            .tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| task.status);
        let Some(current) = current else {
            warn!(task_id = id, "toggle requested for a task not on the board");
            self.ctx.notifier().error(STATUS_FAILED);
            return false;
        };
        self.set_status(id, current.toggled()).await
    }

    /// Delete a task; the cached row goes only after the backend accepts it.
    pub async fn delete_task(&self, id: Id) -> bool {
        let Some(result) = self
            .cancel
            .run_until_cancelled(self.ctx.api().delete_task(id))
            .await
        else {
            return false;
        };

        match result {
            Ok(response) if response.success => {
                if self.cancel.is_cancelled() {
                    return false;
                }
                self.state().tasks.retain(|task| task.id != id);
                info!(task_id = id, "task deleted");
                self.ctx.notifier().success(TASK_DELETED);
                true
            }
            Ok(response) => {
                self.ctx
                    .notifier()
                    .error(&response.message_or(DELETE_FAILED));
                false
            }
            Err(err) => {
                warn!(task_id = id, error = %err, "task delete failed");
                if !self.ctx.session().handle_api_error(&err) {
                    self.ctx.notifier().error(DELETE_FAILED);
                }
                false
            }
        }
    }

    /// Create a task, or update `editing` when set, then refetch the list.
    ///
    /// Returns `Ok(true)` when the backend saved the task.
    ///
    /// # Errors
    /// Returns the failed field checks; nothing is sent in that case.
    pub async fn save_task(
        &self,
        editing: Option<Id>,
        draft: &TaskDraft,
    ) -> Result<bool, ValidationErrors> {
        validate_task(draft)?;
        let draft = draft.normalized();

        let request = async {
            match editing {
                Some(id) => {
                    let patch = TaskPatch::from(draft.clone());
                    self.ctx.api().update_task(id, &patch).await
                }
                None => self.ctx.api().create_task(&draft).await,
            }
        };
        let Some(result) = self.cancel.run_until_cancelled(request).await else {
            return Ok(false);
        };

        match result {
            Ok(response) if response.success => {
                let message = if editing.is_some() {
                    TASK_UPDATED
                } else {
                    TASK_CREATED
                };
                info!(task_id = ?editing, title = %draft.title, "task saved");
                self.ctx.notifier().success(message);
                self.refresh().await;
                Ok(true)
            }
            Ok(response) => {
                self.ctx.notifier().error(&response.message_or(SAVE_FAILED));
                Ok(false)
            }
            Err(err) => {
                warn!(error = %err, "task save failed");
                self.ctx.report_error(&err, SAVE_FAILED);
                Ok(false)
            }
        }
    }

    /// Close the view; in-flight requests never write afterwards.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Whether [`close`](TaskBoard::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Cached tasks from the last successful fetch.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state().tasks.clone()
    }

    /// Cached task by id.
    #[must_use]
    pub fn task(&self, id: Id) -> Option<Task> {
        self.state().tasks.iter().find(|task| task.id == id).cloned()
    }

    /// Current filter set.
    #[must_use]
    pub fn filters(&self) -> TaskFilters {
        self.state().filters.clone()
    }

    /// Category filter options.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.state().categories.clone()
    }

    /// Whether the latest fetch is still in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }
}
