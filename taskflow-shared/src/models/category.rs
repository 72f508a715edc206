use serde::{Deserialize, Serialize};

use super::Id;

/// A task category. Categories without an owner are system defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    /// Backend identifier.
    pub id: Id,

    /// Display name.
    pub name: String,

    /// Hex colour, e.g. `#3B82F6`.
    pub color: String,

    /// Owning user; `None` for system defaults.
    #[serde(default)]
    pub user_id: Option<Id>,

    /// Number of tasks filed under this category.
    #[serde(default)]
    pub task_count: u32,
}

impl Category {
    /// System default categories have no owner.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.user_id.is_none()
    }

    /// Only user-created categories are editable.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.user_id.is_some()
    }

    /// User-created categories with no tasks may be deleted.
    #[must_use]
    pub fn can_delete(&self) -> bool {
        self.user_id.is_some() && self.task_count == 0
    }
}

/// Create/update payload for a category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryDraft {
    /// Display name.
    pub name: String,

    /// Hex colour.
    pub color: String,
}
