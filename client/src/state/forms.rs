//! Local validation for the ask, answer, bug-report, and auth forms.
//!
//! Validation runs synchronously before any network call; a form that fails
//! here never reaches the HTTP client.

#[cfg(test)]
#[path = "forms_test.rs"]
mod forms_test;

use crate::net::types::{BugReport, NewProblem, Severity};

/// Longest accepted problem title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// User-facing validation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("{0} is required.")]
    Required(&'static str),
    #[error("{field} must be at most {max} characters.")]
    TooLong { field: &'static str, max: usize },
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Password must be at least {0} characters.")]
    PasswordTooShort(usize),
}

fn required(value: &str, field: &'static str) -> Result<String, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DraftError::Required(field));
    }
    Ok(trimmed.to_owned())
}

/// Ask-a-question form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProblemDraft {
    pub title: String,
    pub description: String,
    pub category: String,
}

impl ProblemDraft {
    pub fn validate(&self) -> Result<NewProblem, DraftError> {
        let title = required(&self.title, "Title")?;
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(DraftError::TooLong { field: "Title", max: MAX_TITLE_CHARS });
        }
        let description = required(&self.description, "Description")?;
        let category = Some(self.category.trim().to_owned()).filter(|c| !c.is_empty());
        Ok(NewProblem { title, description, category })
    }

    pub fn title_chars_left(&self) -> i64 {
        let used = i64::try_from(self.title.chars().count()).unwrap_or(i64::MAX);
        i64::try_from(MAX_TITLE_CHARS).unwrap_or(i64::MAX) - used
    }
}

/// Answer form body.
pub fn validate_solution(body: &str) -> Result<String, DraftError> {
    required(body, "Answer")
}

/// Bug report form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BugReportDraft {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl BugReportDraft {
    pub fn validate(&self, page_url: Option<String>) -> Result<BugReport, DraftError> {
        Ok(BugReport {
            title: required(&self.title, "Title")?,
            description: required(&self.description, "Description")?,
            severity: self.severity,
            page_url,
        })
    }
}

/// Login form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginDraft {
    pub username: String,
    pub password: String,
}

impl LoginDraft {
    /// Returns `(username, password)`; the password is not trimmed.
    pub fn validate(&self) -> Result<(String, String), DraftError> {
        let username = required(&self.username, "Username")?;
        if self.password.is_empty() {
            return Err(DraftError::Required("Password"));
        }
        Ok((username, self.password.clone()))
    }
}

/// Minimum password length accepted by the registration form.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Registration form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterDraft {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterDraft {
    /// Returns `(username, email, password)`.
    pub fn validate(&self) -> Result<(String, String, String), DraftError> {
        let username = required(&self.username, "Username")?;
        let email = required(&self.email, "Email")?;
        if !looks_like_email(&email) {
            return Err(DraftError::InvalidEmail);
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(DraftError::PasswordTooShort(MIN_PASSWORD_CHARS));
        }
        Ok((username, email, self.password.clone()))
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
