use anyhow::Result;
use clap::Args;
use colored::Colorize;
use shared::{
    config::ClientConfig,
    validation::{validate_login, validate_registration},
};

use super::{authenticated, context};
use crate::terminal::{password, print_validation_errors, value_or_prompt};

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email; prompted for when omitted
    #[arg(long, short)]
    pub email: Option<String>,

    /// Read the password from the first line of stdin instead of the terminal
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Full name; prompted for when omitted
    #[arg(long, short)]
    pub name: Option<String>,

    /// Account email; prompted for when omitted
    #[arg(long, short)]
    pub email: Option<String>,

    /// Read the password from the first line of stdin instead of the terminal
    #[arg(long)]
    pub password_stdin: bool,
}

pub async fn login(config: &ClientConfig, args: LoginArgs) -> Result<bool> {
    let email = value_or_prompt(args.email, "Email: ")?;
    let password = password("Password: ", args.password_stdin)?;
    if let Err(errors) = validate_login(&email, &password) {
        print_validation_errors(&errors);
        return Ok(false);
    }

    let ctx = context(config).await?;
    let outcome = ctx.session().login(&email, &password).await;
    if outcome.success {
        if let Some(user) = ctx.session().current_user() {
            println!("Logged in as {} <{}>", user.name.bold(), user.email);
        }
    }
    Ok(outcome.success)
}

pub async fn register(config: &ClientConfig, args: RegisterArgs) -> Result<bool> {
    let name = value_or_prompt(args.name, "Name: ")?;
    let email = value_or_prompt(args.email, "Email: ")?;
    let password_value = password("Password: ", args.password_stdin)?;
    let confirmation = if args.password_stdin {
        password_value.clone()
    } else {
        password("Confirm password: ", false)?
    };
    if let Err(errors) = validate_registration(&name, &email, &password_value, &confirmation) {
        print_validation_errors(&errors);
        return Ok(false);
    }

    let ctx = context(config).await?;
    let outcome = ctx.session().register(&name, &email, &password_value).await;
    Ok(outcome.success)
}

pub async fn logout(config: &ClientConfig) -> Result<bool> {
    let ctx = context(config).await?;
    ctx.session().logout();
    Ok(true)
}

pub async fn whoami(config: &ClientConfig) -> Result<bool> {
    let ctx = authenticated(config).await?;
    let user = ctx.require_user()?;
    println!("{} <{}>", user.name.bold(), user.email);
    println!("id: {}", user.id);
    if let Some(avatar) = &user.avatar_url {
        println!("avatar: {avatar}");
    }
    if let Some(created) = &user.created_at {
        println!("member since: {}", created.0.format("%B %-d, %Y"));
    }
    Ok(true)
}
