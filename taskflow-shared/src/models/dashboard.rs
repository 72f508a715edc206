use serde::{Deserialize, Serialize};

use super::Task;

/// Task counters shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DashboardStats {
    pub total_tasks: u32,
    pub completed_tasks: u32,
    pub in_progress_tasks: u32,
    pub pending_tasks: u32,
    pub overdue_tasks: u32,
}

impl DashboardStats {
    /// Completed share of all tasks as a whole percentage.
    #[must_use]
    pub fn completion_rate(&self) -> u32 {
        if self.total_tasks == 0 {
            return 0;
        }
        let rate = u64::from(self.completed_tasks) * 100 / u64::from(self.total_tasks);
        u32::try_from(rate).unwrap_or(100)
    }
}

/// `data` payload of the dashboard endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardData {
    #[serde(default)]
    pub stats: DashboardStats,
    #[serde(default, rename = "recentTasks")]
    pub recent_tasks: Vec<Task>,
    #[serde(default, rename = "upcomingTasks")]
    pub upcoming_tasks: Vec<Task>,
}
