//! Store collaborator contracts for user persistence
//!
//! The store is split into the three narrow capabilities the orchestrators
//! actually need: existence checks, reads and writes. All implementations
//! may fail and may be slow; nothing here assumes retries are safe.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entity::User;
use super::value_objects::UserStatus;
use crate::domain::DomainError;

/// Persisted projection of a user aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub status: i16,
    pub external_auth_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_uuid(),
            email: user.email().as_str().to_string(),
            full_name: user.full_name().as_str().to_string(),
            status: user.status().as_i16(),
            external_auth_id: user.external_auth_id().as_str().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Field set written back on mutation; identity fields never change
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    pub id: Uuid,
    pub full_name: String,
    pub status: i16,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserUpdate {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().as_uuid(),
            full_name: user.full_name().as_str().to_string(),
            status: user.status().as_i16(),
            updated_at: user.updated_at(),
        }
    }
}

/// Filter and page window for listing users
#[derive(Debug, Clone, PartialEq)]
pub struct UserListQuery {
    pub status: Option<UserStatus>,
    pub page: u32,
    pub limit: u32,
}

/// One page of records plus the unpaged total
#[derive(Debug, Clone)]
pub struct UserPage {
    pub records: Vec<UserRecord>,
    pub total: u64,
}

/// Read side of the store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserReader: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError>;

    /// Page through records, newest first
    async fn find_all(&self, query: UserListQuery) -> Result<UserPage, DomainError>;
}

/// Write side of the store
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserWriter: Send + Sync {
    async fn create(&self, record: UserRecord) -> Result<UserRecord, DomainError>;

    async fn update(&self, update: UserUpdate) -> Result<UserRecord, DomainError>;
}

/// Uniqueness probe used by the registration saga
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserExistenceChecker: Send + Sync {
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError>;
}
