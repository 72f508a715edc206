pub mod auth;
pub mod categories;
pub mod completion;
pub mod config;
pub mod dashboard;
pub mod profile;
pub mod tasks;

use std::sync::Arc;

use anyhow::{Result, bail};
use client::AppContext;
use shared::config::ClientConfig;

use crate::terminal::TerminalNotifier;

/// Builds the context and settles the session from the stored token.
pub async fn context(config: &ClientConfig) -> Result<AppContext> {
    Ok(AppContext::from_config(config, Arc::new(TerminalNotifier)).await?)
}

/// Like [`context`], but fails unless someone is logged in.
pub async fn authenticated(config: &ClientConfig) -> Result<AppContext> {
    let ctx = context(config).await?;
    if ctx.require_user().is_err() {
        bail!("not logged in; run `taskflow login` first");
    }
    Ok(ctx)
}
