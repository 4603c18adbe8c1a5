//! PostgreSQL user store implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{
    UserExistenceChecker, UserListQuery, UserPage, UserReader, UserRecord, UserUpdate, UserWriter,
};
use crate::domain::DomainError;

/// PostgreSQL implementation of the user store contracts
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Create a new store with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str =
    "id, email, full_name, status, external_auth_id, created_at, updated_at";

fn row_to_record(row: &PgRow) -> Result<UserRecord, DomainError> {
    Ok(UserRecord {
        id: row
            .try_get("id")
            .map_err(|e| DomainError::storage(format!("Failed to read id column: {e}")))?,
        email: row
            .try_get("email")
            .map_err(|e| DomainError::storage(format!("Failed to read email column: {e}")))?,
        full_name: row
            .try_get("full_name")
            .map_err(|e| DomainError::storage(format!("Failed to read full_name column: {e}")))?,
        status: row
            .try_get("status")
            .map_err(|e| DomainError::storage(format!("Failed to read status column: {e}")))?,
        external_auth_id: row.try_get("external_auth_id").map_err(|e| {
            DomainError::storage(format!("Failed to read external_auth_id column: {e}"))
        })?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| DomainError::storage(format!("Failed to read created_at column: {e}")))?,
        updated_at: row
            .try_get("updated_at")
            .map_err(|e| DomainError::storage(format!("Failed to read updated_at column: {e}")))?,
    })
}

#[async_trait]
impl UserReader for PostgresUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by id: {e}")))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by email: {e}")))?;

        match row {
            Some(row) => Ok(Some(row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_all(&self, query: UserListQuery) -> Result<UserPage, DomainError> {
        let offset = i64::from(query.page.saturating_sub(1)) * i64::from(query.limit);
        let limit = i64::from(query.limit);

        let (rows, total) = match query.status {
            Some(status) => {
                let rows = sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM users WHERE status = $1 \
                     ORDER BY created_at DESC LIMIT $2 OFFSET $3"
                ))
                .bind(status.as_i16())
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to list users: {e}")))?;

                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE status = $1")
                    .bind(status.as_i16())
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to count users: {e}")))?;

                (rows, total)
            }
            None => {
                let rows = sqlx::query(&format!(
                    "SELECT {SELECT_COLUMNS} FROM users \
                     ORDER BY created_at DESC LIMIT $1 OFFSET $2"
                ))
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to list users: {e}")))?;

                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| DomainError::storage(format!("Failed to count users: {e}")))?;

                (rows, total)
            }
        };

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserPage {
            records,
            total: total.max(0) as u64,
        })
    }
}

#[async_trait]
impl UserWriter for PostgresUserStore {
    async fn create(&self, record: UserRecord) -> Result<UserRecord, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (id, email, full_name, status, external_auth_id, \
                                created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(record.id)
        .bind(&record.email)
        .bind(&record.full_name)
        .bind(record.status)
        .bind(&record.external_auth_id)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::storage(format!(
                    "user with email '{}' already exists",
                    record.email
                ))
            } else {
                DomainError::storage(format!("Failed to create user: {e}"))
            }
        })?;

        row_to_record(&row)
    }

    async fn update(&self, update: UserUpdate) -> Result<UserRecord, DomainError> {
        let row = sqlx::query(&format!(
            "UPDATE users SET full_name = $2, status = $3, updated_at = $4 \
             WHERE id = $1 \
             RETURNING {SELECT_COLUMNS}"
        ))
        .bind(update.id)
        .bind(&update.full_name)
        .bind(update.status)
        .bind(update.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update user: {e}")))?;

        match row {
            Some(row) => row_to_record(&row),
            None => Err(DomainError::storage(format!(
                "user with id '{}' does not exist",
                update.id
            ))),
        }
    }
}

#[async_trait]
impl UserExistenceChecker for PostgresUserStore {
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check user existence: {e}")))?;

        Ok(count > 0)
    }
}
