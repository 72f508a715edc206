//! Profile view: account details and password change.

use shared::{
    models::{ChangePasswordRequest, ProfileUpdate, User, UserPatch},
    validation::{ValidationErrors, validate_password_change, validate_profile},
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{context::AppContext, error::ApiError};

const PROFILE_UPDATED: &str = "Profile updated successfully";
const PROFILE_FAILED: &str = "Failed to update profile";
const PASSWORD_UPDATED: &str = "Password updated successfully";
const PASSWORD_FAILED: &str = "Failed to update password";

/// Why a profile change did not happen.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The form failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
    /// The backend refused or the request failed.
    #[error("{0}")]
    Rejected(String),
}

/// Profile page actions.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    ctx: AppContext,
}

impl ProfileEditor {
    /// Editor for the logged in user.
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Form pre-filled from the cached user.
    #[must_use]
    pub fn form(&self) -> Option<ProfileUpdate> {
        self.ctx
            .session()
            .current_user()
            .map(|user| ProfileUpdate::from_user(&user))
    }

    /// Save name, email and avatar, then merge the result into the session.
    ///
    /// # Errors
    /// Returns why the profile was not updated.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ProfileError> {
        validate_profile(update)?;
        let update = ProfileUpdate {
            name: update.name.trim().to_string(),
            email: update.email.trim().to_string(),
            avatar_url: update.avatar_url.trim().to_string(),
        };

        match self.ctx.api().update_profile(&update).await {
            Ok(response) if response.success => {
                let patch = response.data.as_ref().map_or_else(
                    || UserPatch {
                        name: Some(update.name.clone()),
                        email: Some(update.email.clone()),
                        avatar_url: Some(update.avatar_url.clone()),
                    },
                    UserPatch::from,
                );
                let user = self
                    .ctx
                    .session()
                    .update_user(&patch)
                    .ok_or_else(|| ProfileError::Rejected(PROFILE_FAILED.to_string()))?;
                info!(user_id = user.id, "profile updated");
                self.ctx.notifier().success(PROFILE_UPDATED);
                Ok(user)
            }
            Ok(response) => Err(self.rejected(response.message_or(PROFILE_FAILED))),
            Err(err) => Err(self.failed(&err, PROFILE_FAILED)),
        }
    }

    /// Change the password after checking the confirmation matches.
    ///
    /// # Errors
    /// Returns why the password was not changed.
    pub async fn change_password(
        &self,
        current: &str,
        new_password: &str,
        confirm: &str,
    ) -> Result<(), ProfileError> {
        validate_password_change(current, new_password, confirm)?;
        let request = ChangePasswordRequest {
            current_password: current.to_string(),
            new_password: new_password.to_string(),
        };

        match self.ctx.api().change_password(&request).await {
            Ok(response) if response.success => {
                info!("password changed");
                self.ctx.notifier().success(PASSWORD_UPDATED);
                Ok(())
            }
            Ok(response) => Err(self.rejected(response.message_or(PASSWORD_FAILED))),
            Err(err) => Err(self.failed(&err, PASSWORD_FAILED)),
        }
    }

    fn rejected(&self, message: String) -> ProfileError {
        self.ctx.notifier().error(&message);
        ProfileError::Rejected(message)
    }

    fn failed(&self, err: &ApiError, fallback: &str) -> ProfileError {
        warn!(error = %err, "profile request failed");
        self.ctx.report_error(err, fallback);
        ProfileError::Rejected(err.display_message(fallback))
    }
}
