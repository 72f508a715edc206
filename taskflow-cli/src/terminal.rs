//! Terminal input and output helpers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use client::Notifier;
use colored::{ColoredString, Colorize};
use shared::{
    models::{Category, Task, TaskPriority, TaskStatus},
    validation::ValidationErrors,
};

/// Prints notifications: successes to stdout, errors to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn success(&self, message: &str) {
        println!("{} {message}", "✓".green().bold());
    }

    fn error(&self, message: &str) {
        eprintln!("{} {message}", "✗".red().bold());
    }

    fn info(&self, message: &str) {
        println!("{} {message}", "i".blue().bold());
    }
}

/// Reads one trimmed, non-empty line after printing `message`.
pub fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let trimmed = input.trim().to_string();
    if trimmed.is_empty() {
        bail!("input must not be empty");
    }
    Ok(trimmed)
}

/// Uses `value` when given, otherwise prompts for it.
pub fn value_or_prompt(value: Option<String>, message: &str) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(message),
    }
}

/// Reads a password from the terminal, or one line of stdin when
/// `from_stdin` is set.
pub fn password(message: &str, from_stdin: bool) -> Result<String> {
    if from_stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("failed to read password from stdin")?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }
    rpassword::prompt_password(message).context("failed to read password")
}

/// Asks a yes/no question; anything but `y`/`yes` is no.
pub fn confirm(message: &str) -> Result<bool> {
    print!("{message} [y/N] ");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(
        input.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Prints each failed field check to stderr.
pub fn print_validation_errors(errors: &ValidationErrors) {
    for error in &errors.errors {
        eprintln!("{} {}: {}", "✗".red().bold(), error.field, error.message);
    }
}

fn status_cell(status: TaskStatus) -> ColoredString {
    let label = format!("{:<11}", status.label());
    match status {
        TaskStatus::Completed => label.green(),
        TaskStatus::InProgress => label.yellow(),
        TaskStatus::Pending => label.normal(),
    }
}

fn priority_cell(priority: TaskPriority) -> ColoredString {
    let label = format!("{:<6}", priority.as_str());
    match priority {
        TaskPriority::High => label.red(),
        TaskPriority::Medium => label.yellow(),
        TaskPriority::Low => label.normal(),
    }
}

fn due_cell(task: &Task, today: NaiveDate) -> ColoredString {
    match task.due_date {
        Some(due) if task.is_overdue(today) => format!("{due} (overdue)").red(),
        Some(due) => due.to_string().normal(),
        None => "-".dimmed(),
    }
}

/// Prints tasks as aligned rows.
pub fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("{}", "No tasks found".dimmed());
        return;
    }
    let today = Local::now().date_naive();
    for task in tasks {
        println!(
            "{:>5}  {}  {}  {:<22}  {:<12}  {}",
            task.id,
            status_cell(task.status),
            priority_cell(task.priority),
            due_cell(task, today),
            task.category_name.as_deref().unwrap_or("-"),
            task.title
        );
    }
}

/// Prints categories with the actions each one allows.
pub fn print_categories(categories: &[Category]) {
    if categories.is_empty() {
        println!("{}", "No categories found".dimmed());
        return;
    }
    for category in categories {
        let controls = client::CategoryBoard::controls(category);
        let mut actions = Vec::new();
        if controls.edit {
            actions.push("edit");
        }
        if controls.delete {
            actions.push("delete");
        }
        let kind = if category.is_default() { "default" } else { "custom" };
        println!(
            "{:>5}  {:<20}  {}  {:>3} tasks  {:<7}  {}",
            category.id,
            category.name,
            category.color,
            category.task_count,
            kind,
            if actions.is_empty() {
                "-".to_string()
            } else {
                actions.join(",")
            }
        );
    }
}
