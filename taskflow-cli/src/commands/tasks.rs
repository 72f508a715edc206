use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use client::{FetchOutcome, TaskBoard};
use shared::{
    config::ClientConfig,
    filters::{FilterKey, TaskFilters},
    models::{Id, TaskDraft, TaskPriority, TaskStatus},
};

use super::authenticated;
use crate::terminal::{confirm, print_tasks, print_validation_errors};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// List tasks, optionally filtered
    List(ListArgs),

    /// Create a task
    Add(AddArgs),

    /// Change fields of a task
    Edit(EditArgs),

    /// Flip a task between completed and pending
    Toggle {
        /// Task id
        id: Id,
    },

    /// Set the status of a task
    Status {
        /// Task id
        id: Id,
        /// New status (pending, in_progress, completed)
        status: TaskStatus,
    },

    /// Delete a task
    Rm {
        /// Task id
        id: Id,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Text to search for in titles and descriptions
    #[arg(long, short)]
    pub search: Option<String>,

    /// Only tasks with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Only tasks with this priority
    #[arg(long, short)]
    pub priority: Option<String>,

    /// Only tasks in this category id
    #[arg(long)]
    pub category: Option<String>,

    /// Print the tasks as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn filters(&self) -> TaskFilters {
        let mut filters = TaskFilters::default();
        for (key, value) in [
            (FilterKey::Search, &self.search),
            (FilterKey::Status, &self.status),
            (FilterKey::Priority, &self.priority),
            (FilterKey::CategoryId, &self.category),
        ] {
            if let Some(value) = value {
                filters.set(key, value.as_str());
            }
        }
        filters
    }
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Task title
    pub title: String,

    /// Longer description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Initial status
    #[arg(long, default_value = "pending")]
    pub status: TaskStatus,

    /// Priority (low, medium, high)
    #[arg(long, short, default_value = "medium")]
    pub priority: TaskPriority,

    /// Due date as YYYY-MM-DD
    #[arg(long)]
    pub due: Option<NaiveDate>,

    /// Category id
    #[arg(long)]
    pub category: Option<Id>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Task id
    pub id: Id,

    /// New title
    #[arg(long, short)]
    pub title: Option<String>,

    /// New description
    #[arg(long, short)]
    pub description: Option<String>,

    /// New status
    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// New priority
    #[arg(long, short)]
    pub priority: Option<TaskPriority>,

    /// New due date as YYYY-MM-DD
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<NaiveDate>,

    /// Remove the due date
    #[arg(long)]
    pub clear_due: bool,

    /// New category id
    #[arg(long, conflicts_with = "no_category")]
    pub category: Option<Id>,

    /// Remove the category
    #[arg(long)]
    pub no_category: bool,
}

impl EditArgs {
    fn apply(self, draft: &mut TaskDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        if self.clear_due {
            draft.due_date = None;
        } else if self.due.is_some() {
            draft.due_date = self.due;
        }
        if self.no_category {
            draft.category_id = None;
        } else if self.category.is_some() {
            draft.category_id = self.category;
        }
    }
}

pub async fn run(config: &ClientConfig, command: TaskCommand) -> Result<bool> {
    let ctx = authenticated(config).await?;

    match command {
        TaskCommand::List(args) => {
            let board = TaskBoard::with_filters(ctx, args.filters());
            if !matches!(board.refresh().await, FetchOutcome::Updated(_)) {
                return Ok(false);
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&board.tasks())?);
            } else {
                print_tasks(&board.tasks());
            }
            Ok(true)
        }
        TaskCommand::Add(args) => {
            let draft = TaskDraft {
                title: args.title,
                description: args.description.unwrap_or_default(),
                status: args.status,
                priority: args.priority,
                due_date: args.due,
                category_id: args.category,
            };
            save(&TaskBoard::new(ctx), None, &draft).await
        }
        TaskCommand::Edit(args) => {
            let id = args.id;
            let response = match ctx.api().get_task(id).await {
                Ok(response) => response,
                Err(err) => {
                    ctx.session().handle_api_error(&err);
                    return Err(err).with_context(|| format!("failed to load task {id}"));
                }
            };
            let Some(task) = response.into_data() else {
                anyhow::bail!("task {id} not found");
            };
            let mut draft = TaskDraft::from_task(&task);
            args.apply(&mut draft);
            save(&TaskBoard::new(ctx), Some(id), &draft).await
        }
        TaskCommand::Toggle { id } => {
            let board = TaskBoard::new(ctx);
            if !matches!(board.refresh().await, FetchOutcome::Updated(_)) {
                return Ok(false);
            }
            Ok(board.toggle_status(id).await)
        }
        TaskCommand::Status { id, status } => {
            Ok(TaskBoard::new(ctx).set_status(id, status).await)
        }
        TaskCommand::Rm { id, yes } => {
            if !yes && !confirm(&format!("Delete task {id}?"))? {
                println!("Cancelled");
                return Ok(true);
            }
            Ok(TaskBoard::new(ctx).delete_task(id).await)
        }
    }
}

async fn save(board: &TaskBoard, editing: Option<Id>, draft: &TaskDraft) -> Result<bool> {
    match board.save_task(editing, draft).await {
        Ok(saved) => Ok(saved),
        Err(errors) => {
            print_validation_errors(&errors);
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args_build_filters() {
        let args = ListArgs {
            status: Some("completed".to_string()),
            search: Some("  ".to_string()),
            ..ListArgs::default()
        };
        let query = args.filters().to_query();
        assert_eq!(query.pairs(), vec![("status", "completed")]);
    }

    #[test]
    fn test_edit_args_clear_fields() {
        let mut draft = TaskDraft {
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            category_id: Some(2),
            ..TaskDraft::new("Plan")
        };
        EditArgs {
            id: 1,
            title: Some("Plan v2".to_string()),
            description: None,
            status: None,
            priority: Some(TaskPriority::High),
            due: None,
            clear_due: true,
            category: None,
            no_category: true,
        }
        .apply(&mut draft);

        assert_eq!(draft.title, "Plan v2");
        assert_eq!(draft.priority, TaskPriority::High);
        assert_eq!(draft.due_date, None);
        assert_eq!(draft.category_id, None);
    }
}
