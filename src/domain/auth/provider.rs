//! Identity-provider collaborator contract
//!
//! The provider owns the authoritative credential record and all token
//! cryptography. The core only sequences calls against this trait; session
//! and challenge semantics are provider-defined and passed through verbatim.

use async_trait::async_trait;
use serde::Serialize;

#[cfg(test)]
use mockall::automock;

use crate::domain::DomainError;

/// Lookup key for an identity-provider record
#[derive(Debug, Clone, PartialEq)]
pub enum AuthUserLookup {
    Email(String),
    ExternalAuthId(String),
}

#[derive(Debug, Clone)]
pub struct CreateAuthUser {
    pub email: String,
    pub full_name: String,
}

#[derive(Debug, Clone)]
pub struct CreatedAuthUser {
    pub external_auth_id: String,
}

#[derive(Debug, Clone)]
pub struct UpdateAuthUser {
    pub external_auth_id: String,
    pub full_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct NewPasswordChallenge {
    pub email: String,
    pub new_password: String,
    pub session: String,
}

/// Raw provider authentication outcome
///
/// Either a challenge (name + session) or a token set; which fields are
/// present depends entirely on the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

/// External identity provider holding the authoritative user record
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Whether a record exists for the given lookup key
    async fn check_exists(&self, lookup: AuthUserLookup) -> Result<bool, DomainError>;

    /// Create a provider record; the returned ID is 1:1 with the user
    async fn create(&self, input: CreateAuthUser) -> Result<CreatedAuthUser, DomainError>;

    /// Update mutable provider attributes (display name)
    async fn update(&self, input: UpdateAuthUser) -> Result<(), DomainError>;

    /// Delete the provider record; used only by the register compensation
    async fn remove(&self, external_auth_id: &str) -> Result<(), DomainError>;

    async fn authenticate(
        &self,
        credentials: Credentials,
    ) -> Result<AuthenticationOutput, DomainError>;

    async fn complete_new_password_challenge(
        &self,
        input: NewPasswordChallenge,
    ) -> Result<AuthenticationOutput, DomainError>;

    async fn refresh_tokens(
        &self,
        refresh_token: &str,
    ) -> Result<AuthenticationOutput, DomainError>;
}
