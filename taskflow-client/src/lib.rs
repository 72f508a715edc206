//! `TaskFlow` client: REST API client, session store, and the view
//! controllers (tasks, categories, dashboard, profile) built on them.
//!
//! Everything hangs off an [`AppContext`] constructed once at startup:
//!
//! ```no_run
//! # async fn run() -> Result<(), client::ApiError> {
//! use std::sync::Arc;
//! use client::{AppContext, LogNotifier, TaskBoard};
//! use shared::config::ClientConfig;
//!
//! let config = ClientConfig::with_defaults();
//! let ctx = AppContext::from_config(&config, Arc::new(LogNotifier)).await?;
//! if ctx.require_user().is_ok() {
//!     let board = TaskBoard::new(ctx.clone());
//!     board.refresh().await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod categories;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod notify;
pub mod profile;
pub mod session;
pub mod storage;
pub mod tasks;

#[cfg(test)]
mod test_support;

pub use api::{TaskFlowApi, TaskFlowClient};
pub use categories::{CategoryBoard, CategoryControls, CategoryError};
pub use context::{AppContext, NotAuthenticated};
pub use dashboard::DashboardView;
pub use error::{ApiError, ApiResult};
pub use notify::{Level, LogNotifier, Notifier, RecordingNotifier};
pub use profile::{ProfileEditor, ProfileError};
pub use session::{AuthOutcome, Session, SessionStatus, SessionStore};
pub use storage::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
pub use tasks::{FetchOutcome, TaskBoard};
