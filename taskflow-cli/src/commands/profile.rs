use anyhow::{Result, bail};
use clap::Subcommand;
use client::{ProfileEditor, ProfileError};
use colored::Colorize;
use shared::config::ClientConfig;

use super::authenticated;
use crate::terminal::{password, print_validation_errors};

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Show the profile fields
    Show,

    /// Change name, email or avatar
    Update {
        /// New full name
        #[arg(long, short)]
        name: Option<String>,
        /// New email address
        #[arg(long, short)]
        email: Option<String>,
        /// New avatar URL; pass an empty string to remove it
        #[arg(long, short)]
        avatar: Option<String>,
    },

    /// Change the password (prompts for current, new, and confirmation)
    Password,
}

pub async fn run(config: &ClientConfig, command: ProfileCommand) -> Result<bool> {
    let editor = ProfileEditor::new(authenticated(config).await?);
    let Some(mut form) = editor.form() else {
        bail!("not logged in; run `taskflow login` first");
    };

    match command {
        ProfileCommand::Show => {
            println!("name:   {}", form.name.bold());
            println!("email:  {}", form.email);
            if !form.avatar_url.is_empty() {
                println!("avatar: {}", form.avatar_url);
            }
            Ok(true)
        }
        ProfileCommand::Update {
            name,
            email,
            avatar,
        } => {
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(avatar) = avatar {
                form.avatar_url = avatar;
            }
            report(editor.update_profile(&form).await.map(|_| ()))
        }
        ProfileCommand::Password => {
            let current = password("Current password: ", false)?;
            let new_password = password("New password: ", false)?;
            let confirmation = password("Confirm new password: ", false)?;
            report(
                editor
                    .change_password(&current, &new_password, &confirmation)
                    .await,
            )
        }
    }
}

fn report(result: Result<(), ProfileError>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(ProfileError::Invalid(errors)) => {
            print_validation_errors(&errors);
            Ok(false)
        }
        Err(ProfileError::Rejected(_)) => Ok(false),
    }
}
