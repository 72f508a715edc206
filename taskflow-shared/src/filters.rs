//! # Task filters
//!
//! Filter state owned by the task list and its translation into the
//! outgoing list query. Empty and whitespace-only values mean "unset" and
//! never reach the backend.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// One field of the task filter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Search,
    Status,
    Priority,
    CategoryId,
}

impl FilterKey {
    /// Every filter key, in form order.
    pub const ALL: [Self; 4] = [Self::Search, Self::Status, Self::Priority, Self::CategoryId];

    /// Query parameter name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::CategoryId => "category_id",
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "search" => Ok(Self::Search),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "category_id" | "category" => Ok(Self::CategoryId),
            _ => Err("unknown filter key"),
        }
    }
}

/// Raw filter form state. Each field is free text; empty means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub search: String,
    pub status: String,
    pub priority: String,
    pub category_id: String,
}

impl TaskFilters {
    /// Replace one field.
    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        match key {
            FilterKey::Search => self.search = value,
            FilterKey::Status => self.status = value,
            FilterKey::Priority => self.priority = value,
            FilterKey::CategoryId => self.category_id = value,
        }
    }

    /// Current raw value of one field.
    #[must_use]
    pub fn get(&self, key: FilterKey) -> &str {
        match key {
            FilterKey::Search => &self.search,
            FilterKey::Status => &self.status,
            FilterKey::Priority => &self.priority,
            FilterKey::CategoryId => &self.category_id,
        }
    }

    /// Build the outgoing query: trimmed values, blanks dropped.
    #[must_use]
    pub fn to_query(&self) -> TaskListQuery {
        TaskListQuery {
            search: clean(&self.search),
            status: clean(&self.status),
            priority: clean(&self.priority),
            category_id: clean(&self.category_id),
        }
    }
}

fn clean(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Query string sent to the task list endpoint. Only present fields are
/// serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl TaskListQuery {
    /// Present parameters as `(name, value)` pairs in key order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            (FilterKey::Search, &self.search),
            (FilterKey::Status, &self.status),
            (FilterKey::Priority, &self.priority),
            (FilterKey::CategoryId, &self.category_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|value| (key.as_str(), value)))
        .collect()
    }

    /// True when no filter is applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }
}
