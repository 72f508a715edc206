use anyhow::Result;
use client::DashboardView;
use colored::Colorize;
use shared::config::ClientConfig;

use super::authenticated;
use crate::terminal::print_tasks;

pub async fn show(config: &ClientConfig, json: bool) -> Result<bool> {
    let view = DashboardView::new(authenticated(config).await?);
    if !view.load().await {
        if let Some(error) = view.error() {
            eprintln!("{} {error}", "✗".red().bold());
        }
        return Ok(false);
    }
    let Some(data) = view.data() else {
        return Ok(false);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(true);
    }

    let stats = data.stats;
    println!("{}", "Overview".bold());
    println!("  total:       {}", stats.total_tasks);
    println!("  completed:   {}", stats.completed_tasks.to_string().green());
    println!("  in progress: {}", stats.in_progress_tasks.to_string().yellow());
    println!("  pending:     {}", stats.pending_tasks);
    println!("  overdue:     {}", stats.overdue_tasks.to_string().red());
    println!("  completion:  {}%", stats.completion_rate());

    println!();
    println!("{}", "Recent tasks".bold());
    print_tasks(&data.recent_tasks);

    println!();
    println!("{}", "Upcoming".bold());
    print_tasks(&data.upcoming_tasks);
    Ok(true)
}
