//! Value objects owned by the user aggregate
//!
//! Each constructor either returns a valid immutable instance or fails with
//! `DomainError::InvalidValueObject` naming the violated constraint. There
//! are no mutators; a "change" always produces a new instance.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_email, validate_external_auth_id, validate_full_name};
use crate::domain::DomainError;

/// Email address - lowercase, trimmed, `local@domain.tld`, max 254 chars
///
/// The email is the identity lookup key; uniqueness across the store is
/// enforced by the registration saga, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let normalized = value.into().trim().to_lowercase();
        validate_email(&normalized)
            .map_err(|e| DomainError::invalid_value_object("Email", e.to_string()))?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full name - trimmed, 2-100 chars, letters/spaces/hyphens/apostrophes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FullName(String);

impl FullName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let trimmed = value.into().trim().to_string();
        validate_full_name(&trimmed)
            .map_err(|e| DomainError::invalid_value_object("FullName", e.to_string()))?;
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for FullName {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FullName> for String {
    fn from(name: FullName) -> Self {
        name.0
    }
}

impl std::fmt::Display for FullName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier issued by the identity provider, 1:1 with a user
///
/// Set once at registration, never reassigned afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ExternalAuthId(String);

impl ExternalAuthId {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let trimmed = value.into().trim().to_string();
        validate_external_auth_id(&trimmed)
            .map_err(|e| DomainError::invalid_value_object("ExternalAuthId", e.to_string()))?;
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ExternalAuthId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExternalAuthId> for String {
    fn from(id: ExternalAuthId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ExternalAuthId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User identifier - UUID generated at registration, never reused
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier for a newly registered user
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier received from outside the domain
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        let uuid = Uuid::parse_str(value).map_err(|_| {
            DomainError::invalid_value_object("UserId", "User ID must be a valid UUID")
        })?;
        Ok(Self(uuid))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a user account
///
/// PENDING is the only valid creation state; ACTIVE and INACTIVE are
/// reachable only through the rule-gated aggregate transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
    Inactive,
}

impl UserStatus {
    /// Persisted representation (0 pending, 1 active, 2 inactive)
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Active => 1,
            Self::Inactive => 2,
        }
    }

    /// Lowercase boundary representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn is_inactive(self) -> bool {
        matches!(self, Self::Inactive)
    }
}

impl TryFrom<i16> for UserStatus {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Active),
            2 => Ok(Self::Inactive),
            other => Err(DomainError::invalid_value_object(
                "UserStatus",
                format!("User status '{other}' is out of range. Allowed values: 0, 1, 2"),
            )),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(DomainError::invalid_value_object(
                "UserStatus",
                format!("Unknown user status '{other}'"),
            )),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
