//! Category list view.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::{
    models::{ApiResponse, Category, CategoryDraft, Id},
    validation::{ValidationErrors, validate_category},
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{context::AppContext, error::ApiResult};

const LOAD_FAILED: &str = "Failed to load categories";
const CATEGORY_CREATED: &str = "Category created successfully";
const CATEGORY_UPDATED: &str = "Category updated successfully";
const SAVE_FAILED: &str = "Failed to save category";
const CATEGORY_DELETED: &str = "Category deleted successfully";
const DELETE_FAILED: &str = "Failed to delete category";

/// Why a category operation did not happen.
#[derive(Debug, Error)]
pub enum CategoryError {
    /// No such category on the board.
    #[error("category {0} not found")]
    NotFound(Id),
    /// Default categories cannot be edited.
    #[error("category {0} cannot be edited")]
    NotEditable(Id),
    /// Default categories and categories with tasks cannot be deleted.
    #[error("category {0} cannot be deleted")]
    NotDeletable(Id),
    /// The form failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// The backend refused or the request failed.
    #[error("{0}")]
    Rejected(String),
    /// The view was closed before the response arrived.
    #[error("view closed")]
    Cancelled,
}

/// Which row actions a category offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryControls {
    /// Edit button.
    pub edit: bool,
    /// Delete button.
    pub delete: bool,
}

#[derive(Debug, Default)]
struct CategoryState {
    categories: Vec<Category>,
    loading: bool,
}

/// Category list view and its mutations.
#[derive(Debug)]
pub struct CategoryBoard {
    ctx: AppContext,
    state: Mutex<CategoryState>,
    cancel: CancellationToken,
}

impl CategoryBoard {
    /// Empty board. Call [`refresh`](CategoryBoard::refresh) to load it.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(CategoryState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, CategoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Actions offered for `category`.
    #[must_use]
    pub fn controls(category: &Category) -> CategoryControls {
        CategoryControls {
            edit: category.can_edit(),
            delete: category.can_delete(),
        }
    }

    /// Reload the list. Returns whether it was replaced.
    pub async fn refresh(&self) -> bool {
        self.state().loading = true;
        let Some(result) = self
            .cancel
            .run_until_cancelled(self.ctx.api().list_categories())
            .await
        else {
            return false;
        };
        if self.cancel.is_cancelled() {
            return false;
        }
        self.state().loading = false;

        match result {
            Ok(response) if response.success => {
                self.state().categories = response.data.unwrap_or_default();
                true
            }
            Ok(response) => {
                warn!(message = ?response.message, "category list rejected");
                self.ctx.notifier().error(LOAD_FAILED);
                false
            }
            Err(err) => {
                warn!(error = %err, "failed to load categories");
                if !self.ctx.session().handle_api_error(&err) {
                    self.ctx.notifier().error(LOAD_FAILED);
                }
                false
            }
        }
    }

    /// Create a category, then reload the list.
    ///
    /// # Errors
    /// Returns why the category was not created.
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, CategoryError> {
        validate_category(draft)?;
        let draft = trimmed(draft);
        let request = self.ctx.api().create_category(&draft);
        let created = self.finish_save(request, CATEGORY_CREATED).await?;
        info!(category_id = created.id, "category created");
        Ok(created)
    }

    /// Update a user-owned category, then reload the list.
    ///
    /// # Errors
    /// Returns why the category was not updated.
    pub async fn update(&self, id: Id, draft: &CategoryDraft) -> Result<Category, CategoryError> {
        let existing = self.category(id).ok_or(CategoryError::NotFound(id))?;
        if !existing.can_edit() {
            return Err(CategoryError::NotEditable(id));
        }
        validate_category(draft)?;
        let draft = trimmed(draft);
        let request = self.ctx.api().update_category(id, &draft);
        let updated = self.finish_save(request, CATEGORY_UPDATED).await?;
        info!(category_id = id, "category updated");
        Ok(updated)
    }

    async fn finish_save(
        &self,
        request: impl Future<Output = ApiResult<ApiResponse<Category>>>,
        success: &str,
    ) -> Result<Category, CategoryError> {
        let result = self
            .cancel
            .run_until_cancelled(request)
            .await
            .ok_or(CategoryError::Cancelled)?;

        let message = match result {
            Ok(response) if response.success => {
                if let Some(category) = response.data {
                    self.ctx.notifier().success(success);
                    self.refresh().await;
                    return Ok(category);
                }
                SAVE_FAILED.to_string()
            }
            Ok(response) => response.message_or(SAVE_FAILED),
            Err(err) => {
                warn!(error = %err, "category save failed");
                if self.ctx.session().handle_api_error(&err) {
                    return Err(CategoryError::Rejected(err.display_message(SAVE_FAILED)));
                }
                err.display_message(SAVE_FAILED)
            }
        };
        self.ctx.notifier().error(&message);
        Err(CategoryError::Rejected(message))
    }

    /// Delete a user-owned category without tasks; the row goes only after
    /// the backend accepts it.
    ///
    /// # Errors
    /// Returns why the category was not deleted.
    pub async fn delete(&self, id: Id) -> Result<(), CategoryError> {
        let existing = self.category(id).ok_or(CategoryError::NotFound(id))?;
        if !existing.can_delete() {
            return Err(CategoryError::NotDeletable(id));
        }

        let result = self
            .cancel
            .run_until_cancelled(self.ctx.api().delete_category(id))
            .await
            .ok_or(CategoryError::Cancelled)?;

        let message = match result {
            Ok(response) if response.success => {
                if self.cancel.is_cancelled() {
                    return Err(CategoryError::Cancelled);
                }
                self.state().categories.retain(|category| category.id != id);
                info!(category_id = id, "category deleted");
                self.ctx.notifier().success(CATEGORY_DELETED);
                return Ok(());
            }
            Ok(response) => response.message_or(DELETE_FAILED),
            Err(err) => {
                warn!(category_id = id, error = %err, "category delete failed");
                if self.ctx.session().handle_api_error(&err) {
                    return Err(CategoryError::Rejected(err.display_message(DELETE_FAILED)));
                }
                err.display_message(DELETE_FAILED)
            }
        };
        self.ctx.notifier().error(&message);
        Err(CategoryError::Rejected(message))
    }

    /// Close the view; in-flight requests never write afterwards.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Cached categories.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.state().categories.clone()
    }

    /// Cached category by id.
    #[must_use]
    pub fn category(&self, id: Id) -> Option<Category> {
        self.state()
            .categories
            .iter()
            .find(|category| category.id == id)
            .cloned()
    }

    /// Whether a reload is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }
}

fn trimmed(draft: &CategoryDraft) -> CategoryDraft {
    CategoryDraft {
        name: draft.name.trim().to_string(),
        color: draft.color.trim().to_string(),
    }
}
