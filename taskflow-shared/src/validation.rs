//! # Form validation
//!
//! Client-side checks run at the form boundary. A form that fails
//! validation never reaches the network.

use regex::Regex;
use std::{fmt, sync::LazyLock};
use thiserror::Error;

use crate::models::{CategoryDraft, ProfileUpdate, TaskDraft};

/// Minimum password length accepted by the login, register and password forms.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Minimum trimmed length of a person's name.
pub const MIN_NAME_LEN: usize = 2;
/// Maximum task title length.
pub const MAX_TITLE_LEN: usize = 200;
/// Maximum task description length.
pub const MAX_DESCRIPTION_LEN: usize = 1000;
/// Maximum category name length.
pub const MAX_CATEGORY_NAME_LEN: usize = 50;

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+$").expect("email pattern is valid"));
static COLOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("colour pattern is valid"));

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field name.
    pub field: &'static str,
    /// Message shown next to the field.
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All failed checks for one form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join_errors(.errors))]
pub struct ValidationErrors {
    /// Failures in field order.
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    /// Whether no check failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    fn check_email(&mut self, email: &str) {
        if email.trim().is_empty() {
            self.push("email", "Email is required");
        } else if !EMAIL_PATTERN.is_match(email) {
            self.push("email", "Invalid email address");
        }
    }

    fn check_password(&mut self, field: &'static str, password: &str, required: &str) {
        if password.is_empty() {
            self.push(field, required);
        } else if password.chars().count() < MIN_PASSWORD_LEN {
            self.push(
                field,
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            );
        }
    }

    fn check_name(&mut self, name: &str) {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            self.push("name", "Name is required");
        } else if trimmed.chars().count() < MIN_NAME_LEN {
            self.push(
                "name",
                format!("Name must be at least {MIN_NAME_LEN} characters"),
            );
        }
    }
}

/// Login form checks.
///
/// # Errors
/// Returns every failed field check.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check_email(email);
    errors.check_password("password", password, "Password is required");
    errors.into_result()
}

/// Registration form checks.
///
/// # Errors
/// Returns every failed field check.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check_name(name);
    errors.check_email(email);
    errors.check_password("password", password, "Password is required");
    if confirm != password {
        errors.push("confirmPassword", "Passwords do not match");
    }
    errors.into_result()
}

/// Profile form checks. The avatar URL is optional.
///
/// # Errors
/// Returns every failed field check.
pub fn validate_profile(update: &ProfileUpdate) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.check_name(&update.name);
    errors.check_email(&update.email);
    errors.into_result()
}

/// Password change form checks.
///
/// # Errors
/// Returns every failed field check.
pub fn validate_password_change(
    current: &str,
    new_password: &str,
    confirm: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    if current.is_empty() {
        errors.push("currentPassword", "Current password is required");
    }
    errors.check_password("newPassword", new_password, "New password is required");
    if confirm.is_empty() {
        errors.push("confirmPassword", "Please confirm your new password");
    } else if confirm != new_password {
        errors.push("confirmPassword", "Passwords do not match");
    }
    errors.into_result()
}

/// Task editor checks.
///
/// # Errors
/// Returns every failed field check.
pub fn validate_task(draft: &TaskDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let title = draft.title.trim();
    if title.is_empty() {
        errors.push("title", "Task title is required");
    } else if title.chars().count() > MAX_TITLE_LEN {
        errors.push(
            "title",
            format!("Title must be less than {MAX_TITLE_LEN} characters"),
        );
    }
    if draft.description.trim().chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(
            "description",
            format!("Description must be less than {MAX_DESCRIPTION_LEN} characters"),
        );
    }
    errors.into_result()
}

/// Category form checks.
///
/// # Errors
/// Returns every failed field check.
pub fn validate_category(draft: &CategoryDraft) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let name = draft.name.trim();
    if name.is_empty() {
        errors.push("name", "Category name is required");
    } else if name.chars().count() > MAX_CATEGORY_NAME_LEN {
        errors.push(
            "name",
            format!("Name must be less than {MAX_CATEGORY_NAME_LEN} characters"),
        );
    }
    if !COLOR_PATTERN.is_match(draft.color.trim()) {
        errors.push("color", "Colour must look like #RRGGBB");
    }
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_accepts_valid_credentials() {
        assert!(validate_login("ann@example.com", "secret1").is_ok());
    }

    #[test]
    fn test_login_reports_each_field() {
        let errors = validate_login("not-an-email", "abc").unwrap_err();
        assert_eq!(errors.message_for("email"), Some("Invalid email address"));
        assert_eq!(
            errors.message_for("password"),
            Some("Password must be at least 6 characters")
        );
    }

    #[test]
    fn test_login_requires_fields() {
        let errors = validate_login("", "").unwrap_err();
        assert_eq!(errors.message_for("email"), Some("Email is required"));
        assert_eq!(errors.message_for("password"), Some("Password is required"));
    }

    #[test]
    fn test_email_with_whitespace_is_rejected() {
        assert!(validate_login("ann @example.com", "secret1").is_err());
    }

    #[test]
    fn test_registration_confirmation_must_match() {
        let errors =
            validate_registration("Ann", "ann@example.com", "secret1", "secret2").unwrap_err();
        assert_eq!(errors.errors.len(), 1);
        assert_eq!(
            errors.message_for("confirmPassword"),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn test_registration_short_name() {
        let errors = validate_registration(" A ", "a@x.com", "secret1", "secret1").unwrap_err();
        assert_eq!(
            errors.message_for("name"),
            Some("Name must be at least 2 characters")
        );
    }

    #[test]
    fn test_profile_avatar_is_optional() {
        let update = ProfileUpdate {
            name: "Bo".to_string(),
            email: "bo@x.com".to_string(),
            avatar_url: String::new(),
        };
        assert!(validate_profile(&update).is_ok());
    }

    #[test]
    fn test_password_change_rules() {
        assert!(validate_password_change("old-pass", "new-pass", "new-pass").is_ok());

        let errors = validate_password_change("", "short", "").unwrap_err();
        assert_eq!(
            errors.message_for("currentPassword"),
            Some("Current password is required")
        );
        assert!(errors.message_for("newPassword").is_some());
        assert_eq!(
            errors.message_for("confirmPassword"),
            Some("Please confirm your new password")
        );
    }

    #[test]
    fn test_task_title_limits() {
        assert!(validate_task(&TaskDraft::new("Ship it")).is_ok());
        assert!(validate_task(&TaskDraft::new("   ")).is_err());
        assert!(validate_task(&TaskDraft::new("x".repeat(MAX_TITLE_LEN + 1))).is_err());
    }

    #[test]
    fn test_task_description_limit() {
        let mut draft = TaskDraft::new("Ship it");
        draft.description = "d".repeat(MAX_DESCRIPTION_LEN + 1);
        let errors = validate_task(&draft).unwrap_err();
        assert!(errors.message_for("description").is_some());
    }

    #[test]
    fn test_category_rules() {
        let good = CategoryDraft {
            name: "Errands".to_string(),
            color: "#10b981".to_string(),
        };
        assert!(validate_category(&good).is_ok());

        let bad = CategoryDraft {
            name: String::new(),
            color: "green".to_string(),
        };
        let errors = validate_category(&bad).unwrap_err();
        assert_eq!(errors.errors.len(), 2);
    }

    #[test]
    fn test_validation_errors_display_joins_fields() {
        let errors = validate_login("", "").unwrap_err();
        assert_eq!(
            errors.to_string(),
            "email: Email is required; password: Password is required"
        );
    }
}
