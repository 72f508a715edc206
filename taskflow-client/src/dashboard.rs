//! Dashboard view: counters plus recent and upcoming tasks.

use std::sync::{Mutex, MutexGuard, PoisonError};

use shared::models::DashboardData;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::context::AppContext;

const LOAD_FAILED: &str = "Failed to load dashboard data";

#[derive(Debug, Default)]
struct DashboardState {
    data: Option<DashboardData>,
    error: Option<String>,
    loading: bool,
}

/// Dashboard view state. A failed load keeps the previous data and sets
/// [`error`](DashboardView::error); calling [`load`](DashboardView::load)
/// again is the retry.
#[derive(Debug)]
pub struct DashboardView {
    ctx: AppContext,
    state: Mutex<DashboardState>,
    cancel: CancellationToken,
}

impl DashboardView {
    /// Empty view.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            state: Mutex::new(DashboardState::default()),
            cancel: CancellationToken::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch the dashboard. Returns whether the data was replaced.
    pub async fn load(&self) -> bool {
        self.state().loading = true;
        let Some(result) = self
            .cancel
            .run_until_cancelled(self.ctx.api().dashboard())
            .await
        else {
            return false;
        };
        if self.cancel.is_cancelled() {
            return false;
        }

        let data = match result {
            Ok(response) => response.into_data(),
            Err(err) => {
                warn!(error = %err, "failed to load dashboard");
                self.ctx.session().handle_api_error(&err);
                None
            }
        };

        let mut state = self.state();
        state.loading = false;
        if let Some(data) = data {
            state.data = Some(data);
            state.error = None;
            true
        } else {
            state.error = Some(LOAD_FAILED.to_string());
            false
        }
    }

    /// Close the view; an in-flight load never writes afterwards.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Last successfully loaded data.
    #[must_use]
    pub fn data(&self) -> Option<DashboardData> {
        self.state().data.clone()
    }

    /// Error from the last load, cleared by a successful one.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Whether a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state().loading
    }
}
