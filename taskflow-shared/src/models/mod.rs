//! Wire models exchanged with the `TaskFlow` REST backend.

pub mod auth;
pub mod category;
pub mod dashboard;
pub mod envelope;
pub mod task;
pub mod timestamp;
pub mod user;

pub use auth::{AuthData, ChangePasswordRequest, LoginRequest, RegisterRequest, VerifyData};
pub use category::{Category, CategoryDraft};
pub use dashboard::{DashboardData, DashboardStats};
pub use envelope::ApiResponse;
pub use task::{Task, TaskDraft, TaskList, TaskPatch, TaskPriority, TaskStatus};
pub use timestamp::Timestamp;
pub use user::{ProfileUpdate, User, UserPatch};

/// Identifier type used by the backend for every resource.
pub type Id = i64;
