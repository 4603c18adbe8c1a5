//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user field validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email format is invalid. Expected something like: user@example.com")]
    InvalidEmailFormat,

    #[error("Full name cannot be empty")]
    EmptyFullName,

    #[error("Full name is too short. Minimum length is {0} characters")]
    FullNameTooShort(usize),

    #[error("Full name exceeds maximum length of {0} characters")]
    FullNameTooLong(usize),

    #[error("Full name may only contain letters, spaces, hyphens and apostrophes")]
    InvalidFullNameCharacters,

    #[error("External auth ID cannot be empty")]
    EmptyExternalAuthId,

    #[error("User status '{0}' is out of range. Allowed values: 0, 1, 2")]
    InvalidStatus(i16),
}

const MAX_EMAIL_LENGTH: usize = 254;
const MIN_FULL_NAME_LENGTH: usize = 2;
const MAX_FULL_NAME_LENGTH: usize = 100;

// One non-space run, exactly one '@', and a dot somewhere in the domain part.
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

// Letters (including accented Latin), spaces, hyphens and apostrophes.
static FULL_NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ\s'-]+$").expect("full name pattern is valid")
});

/// Validate an already-normalized (trimmed, lowercased) email address
///
/// Rules:
/// - Cannot be empty
/// - Must match `local@domain.tld`
/// - Maximum 254 characters
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmailFormat);
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    Ok(())
}

/// Validate an already-trimmed full name
///
/// Rules:
/// - Cannot be empty
/// - Between 2 and 100 characters
/// - Letters (accented Latin included), spaces, hyphens and apostrophes only
pub fn validate_full_name(full_name: &str) -> Result<(), UserValidationError> {
    if full_name.is_empty() {
        return Err(UserValidationError::EmptyFullName);
    }

    let length = full_name.chars().count();

    if length < MIN_FULL_NAME_LENGTH {
        return Err(UserValidationError::FullNameTooShort(MIN_FULL_NAME_LENGTH));
    }

    if length > MAX_FULL_NAME_LENGTH {
        return Err(UserValidationError::FullNameTooLong(MAX_FULL_NAME_LENGTH));
    }

    if !FULL_NAME_PATTERN.is_match(full_name) {
        return Err(UserValidationError::InvalidFullNameCharacters);
    }

    Ok(())
}

/// Validate an already-trimmed external auth ID
pub fn validate_external_auth_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyExternalAuthId);
    }

    Ok(())
}
