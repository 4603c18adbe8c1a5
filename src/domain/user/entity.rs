//! User aggregate root

use chrono::{DateTime, Utc};

use super::events::PasswordChanged;
use super::repository::UserRecord;
use super::rules::{check_rule, UserMustBeActiveToDeactivate, UserMustBePendingToActivate};
use super::value_objects::{Email, ExternalAuthId, FullName, UserId, UserStatus};
use crate::domain::DomainError;

/// The user aggregate - the consistency boundary for identity lifecycle
///
/// State machine: PENDING -> ACTIVE -> INACTIVE. `id`, `email`, `created_at`
/// and `external_auth_id` never change after creation; `status`, `full_name`
/// and `updated_at` change only through the methods below.
#[derive(Debug, Clone)]
pub struct User {
    id: UserId,
    email: Email,
    full_name: FullName,
    status: UserStatus,
    external_auth_id: ExternalAuthId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    domain_events: Vec<PasswordChanged>,
}

impl User {
    /// Create a brand-new pending user
    ///
    /// The external auth ID comes from the identity provider, which has
    /// already been written to by the time this runs.
    pub fn register(
        email: impl Into<String>,
        full_name: impl Into<String>,
        external_auth_id: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let now = Utc::now();

        Ok(Self {
            id: UserId::generate(),
            email: Email::new(email)?,
            full_name: FullName::new(full_name)?,
            status: UserStatus::Pending,
            external_auth_id: ExternalAuthId::new(external_auth_id)?,
            created_at: now,
            updated_at: now,
            domain_events: Vec::new(),
        })
    }

    /// Rehydrate an aggregate from its persisted record
    ///
    /// No events are generated; the record may carry any status.
    pub fn reconstitute(record: UserRecord) -> Result<Self, DomainError> {
        Ok(Self {
            id: UserId::from(record.id),
            email: Email::new(record.email)?,
            full_name: FullName::new(record.full_name)?,
            status: UserStatus::try_from(record.status)?,
            external_auth_id: ExternalAuthId::new(record.external_auth_id)?,
            created_at: record.created_at,
            updated_at: record.updated_at,
            domain_events: Vec::new(),
        })
    }

    /// Transition PENDING -> ACTIVE
    pub fn activate(&mut self) -> Result<(), DomainError> {
        check_rule(&UserMustBePendingToActivate::new(self.status))?;

        self.status = UserStatus::Active;
        self.touch();

        Ok(())
    }

    /// Transition ACTIVE -> INACTIVE
    pub fn deactivate(&mut self) -> Result<(), DomainError> {
        check_rule(&UserMustBeActiveToDeactivate::new(self.status))?;

        self.status = UserStatus::Inactive;
        self.touch();

        Ok(())
    }

    /// Replace the full name if a different value was provided
    ///
    /// A no-op (absent or identical value) is not a mutation and does not
    /// bump `updated_at`.
    pub fn update_profile(&mut self, full_name: Option<&str>) -> Result<(), DomainError> {
        let mut has_changes = false;

        if let Some(value) = full_name {
            let new_name = FullName::new(value)?;

            if new_name != self.full_name {
                self.full_name = new_name;
                has_changes = true;
            }
        }

        if has_changes {
            self.touch();
        }

        Ok(())
    }

    /// Record a completed password change
    ///
    /// Enqueues one `PasswordChanged` event; the status is untouched.
    pub fn change_password(&mut self) {
        self.touch();
        self.domain_events
            .push(PasswordChanged::new(self.id.clone(), self.email.clone()));
    }

    /// Return and clear the buffered events, in insertion order
    pub fn pull_domain_events(&mut self) -> Vec<PasswordChanged> {
        std::mem::take(&mut self.domain_events)
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn external_auth_id(&self) -> &ExternalAuthId {
        &self.external_auth_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
