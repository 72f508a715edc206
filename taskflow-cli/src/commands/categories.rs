use anyhow::Result;
use clap::Subcommand;
use client::{CategoryBoard, CategoryError};
use shared::{
    config::ClientConfig,
    models::{CategoryDraft, Id},
};

use super::authenticated;
use crate::terminal::{confirm, print_categories, print_validation_errors};

const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// List categories and the actions each allows
    List {
        /// Print the categories as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a category
    Add {
        /// Category name
        name: String,
        /// Colour as #RRGGBB
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
    },

    /// Rename or recolour one of your categories
    Edit {
        /// Category id
        id: Id,
        /// New name
        #[arg(long, short)]
        name: Option<String>,
        /// New colour as #RRGGBB
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete one of your categories that has no tasks
    Rm {
        /// Category id
        id: Id,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub async fn run(config: &ClientConfig, command: CategoryCommand) -> Result<bool> {
    let board = CategoryBoard::new(authenticated(config).await?);

    match command {
        CategoryCommand::List { json } => {
            if !board.refresh().await {
                return Ok(false);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&board.categories())?);
            } else {
                print_categories(&board.categories());
            }
            Ok(true)
        }
        CategoryCommand::Add { name, color } => {
            let result = board.create(&CategoryDraft { name, color }).await;
            report(result.map(|_| ()))
        }
        CategoryCommand::Edit { id, name, color } => {
            if !board.refresh().await {
                return Ok(false);
            }
            let Some(existing) = board.category(id) else {
                return report(Err(CategoryError::NotFound(id)));
            };
            let draft = CategoryDraft {
                name: name.unwrap_or(existing.name),
                color: color.unwrap_or(existing.color),
            };
            report(board.update(id, &draft).await.map(|_| ()))
        }
        CategoryCommand::Rm { id, yes } => {
            if !board.refresh().await {
                return Ok(false);
            }
            if !yes && !confirm(&format!("Delete category {id}?"))? {
                println!("Cancelled");
                return Ok(true);
            }
            report(board.delete(id).await)
        }
    }
}

/// Prints refusals the board did not already report.
fn report(result: Result<(), CategoryError>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(CategoryError::Invalid(errors)) => {
            print_validation_errors(&errors);
            Ok(false)
        }
        Err(
            err @ (CategoryError::NotFound(_)
            | CategoryError::NotEditable(_)
            | CategoryError::NotDeletable(_)),
        ) => Err(err.into()),
        Err(CategoryError::Rejected(_) | CategoryError::Cancelled) => Ok(false),
    }
}
