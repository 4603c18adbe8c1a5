//! In-memory user store implementation
//!
//! Backs local development and tests; implements all three store contracts
//! over one map so it behaves like a single database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::user::{
    UserExistenceChecker, UserListQuery, UserPage, UserReader, UserRecord, UserUpdate, UserWriter,
};
use crate::domain::DomainError;

/// In-memory implementation of the user store contracts
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    records: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with records
    pub fn with_records(records: Vec<UserRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }
}

#[async_trait]
impl UserReader for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(records.values().find(|r| r.email == email).cloned())
    }

    async fn find_all(&self, query: UserListQuery) -> Result<UserPage, DomainError> {
        let records = self.records.read().await;

        let mut matching: Vec<UserRecord> = records
            .values()
            .filter(|r| match query.status {
                Some(status) => r.status == status.as_i16(),
                None => true,
            })
            .cloned()
            .collect();

        // Newest first, same as the SQL store.
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as u64;
        let skip = (query.page.saturating_sub(1) as usize) * query.limit as usize;

        let page: Vec<UserRecord> = matching
            .into_iter()
            .skip(skip)
            .take(query.limit as usize)
            .collect();

        Ok(UserPage {
            records: page,
            total,
        })
    }
}

#[async_trait]
impl UserWriter for InMemoryUserStore {
    async fn create(&self, record: UserRecord) -> Result<UserRecord, DomainError> {
        let mut records = self.records.write().await;

        if records.contains_key(&record.id) {
            return Err(DomainError::storage(format!(
                "user with id '{}' already exists",
                record.id
            )));
        }

        if records.values().any(|r| r.email == record.email) {
            return Err(DomainError::storage(format!(
                "user with email '{}' already exists",
                record.email
            )));
        }

        records.insert(record.id, record.clone());

        Ok(record)
    }

    async fn update(&self, update: UserUpdate) -> Result<UserRecord, DomainError> {
        let mut records = self.records.write().await;

        let record = records.get_mut(&update.id).ok_or_else(|| {
            DomainError::storage(format!("user with id '{}' does not exist", update.id))
        })?;

        record.full_name = update.full_name;
        record.status = update.status;
        record.updated_at = update.updated_at;

        Ok(record.clone())
    }
}

#[async_trait]
impl UserExistenceChecker for InMemoryUserStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let records = self.records.read().await;
        Ok(records.values().any(|r| r.email == email))
    }
}
