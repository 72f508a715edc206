use serde::{Deserialize, Serialize};

use super::{Id, Timestamp};

/// Account as cached by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Backend identifier.
    pub id: Id,

    /// Display name.
    pub name: String,

    /// Login email address.
    pub email: String,

    /// Optional avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// When the account was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl User {
    /// Merge the present fields of `patch` into this user.
    ///
    /// An empty `avatar_url` clears the avatar.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(avatar) = &patch.avatar_url {
            self.avatar_url = if avatar.trim().is_empty() {
                None
            } else {
                Some(avatar.clone())
            };
        }
    }
}

/// Partial user update applied to the cached session user.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPatch {
    /// Replacement display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Replacement email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Replacement avatar URL; empty clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserPatch {
    /// Patch that only renames the user.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl From<&User> for UserPatch {
    fn from(user: &User) -> Self {
        Self {
            name: Some(user.name.clone()),
            email: Some(user.email.clone()),
            avatar_url: Some(user.avatar_url.clone().unwrap_or_default()),
        }
    }
}

/// Profile form payload sent to the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Full name.
    pub name: String,

    /// Email address.
    pub email: String,

    /// Optional avatar URL.
    #[serde(default)]
    pub avatar_url: String,
}

impl ProfileUpdate {
    /// Pre-fill the form from the cached user.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone().unwrap_or_default(),
        }
    }
}
