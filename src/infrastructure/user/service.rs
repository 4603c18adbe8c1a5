//! User lifecycle service
//!
//! The application-level orchestrators: each method sequences calls to the
//! aggregate and the collaborators, enforcing cross-system consistency.
//! Steps inside a method run strictly in order; the aggregate is rebuilt
//! per request and never shared.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::domain::auth::{
    AuthUserLookup, AuthenticationOutput, CreateAuthUser, Credentials, IdentityProvider,
    NewPasswordChallenge, UpdateAuthUser,
};
use crate::domain::messaging::{EventEnvelope, EventPublisher};
use crate::domain::user::{
    User, UserExistenceChecker, UserId, UserListQuery, UserReader, UserRecord, UserStatus,
    UserUpdate, UserWriter,
};
use crate::domain::DomainError;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Request to register a new user
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub email: String,
    pub full_name: String,
}

/// Projection returned after registration
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredUser {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub status: String,
    pub external_auth_id: String,
    pub created_at: DateTime<Utc>,
}

/// Projection returned after a status transition
#[derive(Debug, Clone, Serialize)]
pub struct StatusChange {
    pub id: String,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

/// Request to update the mutable profile fields
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
}

/// Projection returned after a profile update
#[derive(Debug, Clone, Serialize)]
pub struct UpdatedProfile {
    pub id: String,
    pub full_name: String,
    pub updated_at: DateTime<Utc>,
}

/// Complete token set issued after the new-password challenge
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Token pair issued by the refresh operation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedTokens {
    pub access_token: String,
    pub id_token: String,
    pub expires_in: i64,
}

/// Full single-user projection for the read queries
#[derive(Debug, Clone, Serialize)]
pub struct UserDetails {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub status: String,
    pub external_auth_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDetails {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            full_name: user.full_name().to_string(),
            status: user.status().as_str().to_string(),
            external_auth_id: user.external_auth_id().to_string(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        }
    }
}

/// Request to list users
#[derive(Debug, Clone, Default)]
pub struct ListUsersRequest {
    pub status: Option<UserStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Reduced per-row projection for listings
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Page window metadata
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

/// One page of users plus pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct UserList {
    pub users: Vec<UserSummary>,
    pub pagination: Pagination,
}

/// Orchestrates the user lifecycle across the identity provider, the store
/// and the event bus
pub struct UserService {
    identity_provider: Arc<dyn IdentityProvider>,
    user_reader: Arc<dyn UserReader>,
    user_writer: Arc<dyn UserWriter>,
    existence_checker: Arc<dyn UserExistenceChecker>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl UserService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        user_reader: Arc<dyn UserReader>,
        user_writer: Arc<dyn UserWriter>,
        existence_checker: Arc<dyn UserExistenceChecker>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            identity_provider,
            user_reader,
            user_writer,
            existence_checker,
            event_publisher,
        }
    }

    /// Register a new user
    ///
    /// The one cross-service saga: the identity-provider record is created
    /// first, and if the store write then fails the provider record is
    /// deleted again. A failing compensation is not suppressed - it
    /// propagates, flagging a state that needs manual reconciliation.
    pub async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegisteredUser, DomainError> {
        let provider_has_user = self
            .identity_provider
            .check_exists(AuthUserLookup::Email(request.email.clone()))
            .await?;

        if provider_has_user {
            return Err(DomainError::duplicate_entity("User", "email", request.email.as_str()));
        }

        if self.existence_checker.exists_by_email(&request.email).await? {
            return Err(DomainError::duplicate_entity("User", "email", request.email.as_str()));
        }

        let auth_user = self
            .identity_provider
            .create(CreateAuthUser {
                email: request.email.clone(),
                full_name: request.full_name.clone(),
            })
            .await?;

        let user = User::register(
            request.email.as_str(),
            request.full_name.as_str(),
            auth_user.external_auth_id.as_str(),
        )?;

        if let Err(cause) = self.user_writer.create(UserRecord::from(&user)).await {
            error!(
                external_auth_id = %auth_user.external_auth_id,
                "store create failed after identity-provider create, compensating"
            );

            self.identity_provider
                .remove(&auth_user.external_auth_id)
                .await?;

            return Err(DomainError::transaction_failed(
                "failed to persist user record after identity-provider creation",
                cause,
            ));
        }

        info!(user_id = %user.id(), "user registered");

        Ok(RegisteredUser {
            id: user.id().to_string(),
            email: user.email().to_string(),
            full_name: user.full_name().to_string(),
            status: user.status().as_str().to_string(),
            external_auth_id: user.external_auth_id().to_string(),
            created_at: user.created_at(),
        })
    }

    /// Authenticate against the identity provider
    ///
    /// Pending users may still be mid-challenge, so only inactive users are
    /// rejected up front. The provider result is returned unmodified.
    pub async fn authenticate(
        &self,
        credentials: Credentials,
    ) -> Result<AuthenticationOutput, DomainError> {
        let record = self
            .user_reader
            .find_by_email(&credentials.email)
            .await?
            .ok_or_else(|| {
                DomainError::entity_not_found_by("User", "email", credentials.email.as_str())
            })?;

        let user = User::reconstitute(record)?;

        if user.status().is_inactive() {
            return Err(DomainError::user_not_active(user.id().to_string()));
        }

        self.identity_provider.authenticate(credentials).await
    }

    /// Complete the provider's new-password challenge
    ///
    /// On success the password change is recorded on the aggregate and the
    /// drained events are published one by one, in order, before the tokens
    /// are handed back.
    pub async fn complete_new_password_challenge(
        &self,
        input: NewPasswordChallenge,
    ) -> Result<IssuedTokens, DomainError> {
        let record = self
            .user_reader
            .find_by_email(&input.email)
            .await?
            .ok_or_else(|| DomainError::entity_not_found_by("User", "email", input.email.as_str()))?;

        let output = self
            .identity_provider
            .complete_new_password_challenge(input)
            .await?;

        let AuthenticationOutput {
            access_token,
            id_token,
            refresh_token,
            expires_in,
            ..
        } = output;

        let (access_token, id_token, refresh_token) =
            match (access_token, id_token, refresh_token) {
                (Some(access), Some(id), Some(refresh)) => (access, id, refresh),
                _ => {
                    return Err(DomainError::inconsistency(
                        "incomplete authentication response from identity provider",
                    ));
                }
            };

        let mut user = User::reconstitute(record)?;
        user.change_password();

        for event in user.pull_domain_events() {
            self.event_publisher
                .publish(EventEnvelope {
                    event_name: event.event_name().to_string(),
                    payload: event.to_payload(),
                })
                .await?;
        }

        Ok(IssuedTokens {
            access_token,
            id_token,
            refresh_token,
            expires_in: expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
        })
    }

    /// Exchange a refresh token for fresh access and ID tokens
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
    ) -> Result<RefreshedTokens, DomainError> {
        let output = self.identity_provider.refresh_tokens(refresh_token).await?;

        match (output.access_token, output.id_token) {
            (Some(access_token), Some(id_token)) => Ok(RefreshedTokens {
                access_token,
                id_token,
                expires_in: output.expires_in.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            }),
            _ => Err(DomainError::inconsistency(
                "incomplete authentication response from identity provider",
            )),
        }
    }

    /// Activate a pending user
    pub async fn activate(&self, user_id: &str) -> Result<StatusChange, DomainError> {
        let mut user = self.load_checked_against_provider(user_id).await?;

        user.activate()?;

        self.user_writer.update(UserUpdate::from(&user)).await?;

        info!(user_id = %user.id(), "user activated");

        Ok(StatusChange {
            id: user.id().to_string(),
            status: user.status().as_str().to_string(),
            updated_at: user.updated_at(),
        })
    }

    /// Deactivate an active user
    pub async fn deactivate(&self, user_id: &str) -> Result<StatusChange, DomainError> {
        let mut user = self.load_checked_against_provider(user_id).await?;

        user.deactivate()?;

        self.user_writer.update(UserUpdate::from(&user)).await?;

        info!(user_id = %user.id(), "user deactivated");

        Ok(StatusChange {
            id: user.id().to_string(),
            status: user.status().as_str().to_string(),
            updated_at: user.updated_at(),
        })
    }

    /// Update the mutable profile fields
    ///
    /// The identity provider is updated before the store; there is no
    /// compensation if the store write then fails (see DESIGN.md).
    pub async fn update(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> Result<UpdatedProfile, DomainError> {
        let id = UserId::parse(user_id)?;

        let record = self
            .user_reader
            .find_by_id(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::entity_not_found("User"))?;

        let mut user = User::reconstitute(record)?;
        user.update_profile(request.full_name.as_deref())?;

        self.identity_provider
            .update(UpdateAuthUser {
                external_auth_id: user.external_auth_id().to_string(),
                full_name: request.full_name,
            })
            .await?;

        self.user_writer.update(UserUpdate::from(&user)).await?;

        Ok(UpdatedProfile {
            id: user.id().to_string(),
            full_name: user.full_name().to_string(),
            updated_at: user.updated_at(),
        })
    }

    /// Fetch one user by ID; the identifier is not echoed on a miss
    pub async fn get_by_id(&self, user_id: &str) -> Result<UserDetails, DomainError> {
        let id = UserId::parse(user_id)?;

        let record = self
            .user_reader
            .find_by_id(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::entity_not_found("User"))?;

        let user = User::reconstitute(record)?;

        Ok(UserDetails::from_user(&user))
    }

    /// Fetch one user by email
    pub async fn get_by_email(&self, email: &str) -> Result<UserDetails, DomainError> {
        let record = self
            .user_reader
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::entity_not_found_by("User", "email", email))?;

        let user = User::reconstitute(record)?;

        Ok(UserDetails::from_user(&user))
    }

    /// List users, newest first, with page defaults of 1/10
    pub async fn list(&self, request: ListUsersRequest) -> Result<UserList, DomainError> {
        let page = request.page.unwrap_or(DEFAULT_PAGE).max(1);
        let limit = request.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);

        let result = self
            .user_reader
            .find_all(UserListQuery {
                status: request.status,
                page,
                limit,
            })
            .await?;

        let total_pages = result.total.div_ceil(u64::from(limit));

        let users = result
            .records
            .into_iter()
            .map(|record| {
                let user = User::reconstitute(record)?;
                Ok(UserSummary {
                    id: user.id().to_string(),
                    email: user.email().to_string(),
                    full_name: user.full_name().to_string(),
                    status: user.status().as_str().to_string(),
                    created_at: user.created_at(),
                })
            })
            .collect::<Result<Vec<_>, DomainError>>()?;

        Ok(UserList {
            users,
            pagination: Pagination {
                total: result.total,
                page,
                limit,
                total_pages,
            },
        })
    }

    /// Load the aggregate by ID and verify the identity provider still has
    /// a matching record
    ///
    /// Drift between the store and the provider is fatal and surfaced as-is.
    async fn load_checked_against_provider(&self, user_id: &str) -> Result<User, DomainError> {
        let id = UserId::parse(user_id)?;

        let record = self
            .user_reader
            .find_by_id(id.as_uuid())
            .await?
            .ok_or_else(|| DomainError::entity_not_found("User"))?;

        let user = User::reconstitute(record)?;

        let provider_has_user = self
            .identity_provider
            .check_exists(AuthUserLookup::ExternalAuthId(
                user.external_auth_id().to_string(),
            ))
            .await?;

        if !provider_has_user {
            return Err(DomainError::inconsistency(format!(
                "user {user_id} exists in the store but not in the identity provider"
            )));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::{CreatedAuthUser, MockIdentityProvider};
    use crate::domain::messaging::{MockEventPublisher, PublishedEvent};
    use crate::domain::user::{
        MockUserExistenceChecker, MockUserReader, MockUserWriter, UserPage,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn service(
        identity: MockIdentityProvider,
        reader: MockUserReader,
        writer: MockUserWriter,
        checker: MockUserExistenceChecker,
        publisher: MockEventPublisher,
    ) -> UserService {
        UserService::new(
            Arc::new(identity),
            Arc::new(reader),
            Arc::new(writer),
            Arc::new(checker),
            Arc::new(publisher),
        )
    }

    fn record_with_status(status: UserStatus) -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: Uuid::new_v4(),
            email: "ana.ruiz@example.com".to_string(),
            full_name: "Ana Ruiz".to_string(),
            status: status.as_i16(),
            external_auth_id: "sub-123".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn tokens_output() -> AuthenticationOutput {
        AuthenticationOutput {
            access_token: Some("access".to_string()),
            id_token: Some("id".to_string()),
            refresh_token: Some("refresh".to_string()),
            ..Default::default()
        }
    }

    // Register

    #[tokio::test]
    async fn test_register_creates_in_both_systems() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_check_exists()
            .withf(|lookup| {
                matches!(lookup, AuthUserLookup::Email(email) if email == "a@b.com")
            })
            .times(1)
            .returning(|_| Ok(false));
        identity
            .expect_create()
            .withf(|input| input.email == "a@b.com" && input.full_name == "Ana Ruiz")
            .times(1)
            .returning(|_| {
                Ok(CreatedAuthUser {
                    external_auth_id: "sub-123".to_string(),
                })
            });

        let mut checker = MockUserExistenceChecker::new();
        checker
            .expect_exists_by_email()
            .with(eq("a@b.com"))
            .times(1)
            .returning(|_| Ok(false));

        let mut writer = MockUserWriter::new();
        writer
            .expect_create()
            .withf(|record| {
                record.email == "a@b.com"
                    && record.status == 0
                    && record.external_auth_id == "sub-123"
            })
            .times(1)
            .returning(|record| Ok(record));

        let service = service(
            identity,
            MockUserReader::new(),
            writer,
            checker,
            MockEventPublisher::new(),
        );

        let result = service
            .register(RegisterUserRequest {
                email: "a@b.com".to_string(),
                full_name: "Ana Ruiz".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.status, "pending");
        assert_eq!(result.email, "a@b.com");
        assert_eq!(result.external_auth_id, "sub-123");
    }

    #[tokio::test]
    async fn test_register_rejects_email_known_to_provider() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(true));

        let service = service(
            identity,
            MockUserReader::new(),
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service
            .register(RegisterUserRequest {
                email: "a@b.com".to_string(),
                full_name: "Ana Ruiz".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::DuplicateEntity { .. })));
    }

    #[tokio::test]
    async fn test_register_rejects_email_known_to_store() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(false));

        let mut checker = MockUserExistenceChecker::new();
        checker.expect_exists_by_email().returning(|_| Ok(true));

        let service = service(
            identity,
            MockUserReader::new(),
            MockUserWriter::new(),
            checker,
            MockEventPublisher::new(),
        );

        let result = service
            .register(RegisterUserRequest {
                email: "a@b.com".to_string(),
                full_name: "Ana Ruiz".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::DuplicateEntity { .. })));
    }

    #[tokio::test]
    async fn test_register_compensates_when_store_create_fails() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(false));
        identity.expect_create().returning(|_| {
            Ok(CreatedAuthUser {
                external_auth_id: "sub-123".to_string(),
            })
        });
        identity
            .expect_remove()
            .with(eq("sub-123"))
            .times(1)
            .returning(|_| Ok(()));

        let mut checker = MockUserExistenceChecker::new();
        checker.expect_exists_by_email().returning(|_| Ok(false));

        let mut writer = MockUserWriter::new();
        writer
            .expect_create()
            .returning(|_| Err(DomainError::storage("insert failed")));

        let service = service(
            identity,
            MockUserReader::new(),
            writer,
            checker,
            MockEventPublisher::new(),
        );

        let result = service
            .register(RegisterUserRequest {
                email: "a@b.com".to_string(),
                full_name: "Ana Ruiz".to_string(),
            })
            .await;

        match result {
            Err(DomainError::TransactionFailed { cause, .. }) => {
                assert!(matches!(*cause, DomainError::Storage { .. }));
            }
            other => panic!("expected TransactionFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_register_failing_compensation_propagates() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(false));
        identity.expect_create().returning(|_| {
            Ok(CreatedAuthUser {
                external_auth_id: "sub-123".to_string(),
            })
        });
        identity
            .expect_remove()
            .returning(|_| Err(DomainError::provider("delete rejected")));

        let mut checker = MockUserExistenceChecker::new();
        checker.expect_exists_by_email().returning(|_| Ok(false));

        let mut writer = MockUserWriter::new();
        writer
            .expect_create()
            .returning(|_| Err(DomainError::storage("insert failed")));

        let service = service(
            identity,
            MockUserReader::new(),
            writer,
            checker,
            MockEventPublisher::new(),
        );

        let result = service
            .register(RegisterUserRequest {
                email: "a@b.com".to_string(),
                full_name: "Ana Ruiz".to_string(),
            })
            .await;

        // The inconsistent state surfaces as the provider failure itself.
        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    // Authenticate

    #[tokio::test]
    async fn test_authenticate_passes_provider_result_through() {
        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_email()
            .with(eq("ana.ruiz@example.com"))
            .returning(|_| Ok(Some(record_with_status(UserStatus::Pending))));

        let mut identity = MockIdentityProvider::new();
        identity.expect_authenticate().returning(|_| {
            Ok(AuthenticationOutput {
                challenge_name: Some("NEW_PASSWORD_REQUIRED".to_string()),
                session: Some("session-token".to_string()),
                ..Default::default()
            })
        });

        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let output = service
            .authenticate(Credentials {
                email: "ana.ruiz@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(output.challenge_name.as_deref(), Some("NEW_PASSWORD_REQUIRED"));
        assert_eq!(output.session.as_deref(), Some("session-token"));
        assert!(output.access_token.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_shows_identifier() {
        let mut reader = MockUserReader::new();
        reader.expect_find_by_email().returning(|_| Ok(None));

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service
            .authenticate(Credentials {
                email: "ghost@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        match result {
            Err(DomainError::EntityNotFound { message }) => {
                assert!(message.contains("ghost@example.com"));
            }
            other => panic!("expected EntityNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_rejects_inactive_user() {
        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_email()
            .returning(|_| Ok(Some(record_with_status(UserStatus::Inactive))));

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service
            .authenticate(Credentials {
                email: "ana.ruiz@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::UserNotActive { .. })));
    }

    // Complete new password challenge

    #[tokio::test]
    async fn test_complete_challenge_publishes_password_changed() {
        let record = record_with_status(UserStatus::Pending);
        let user_id = record.id.to_string();

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_email()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_complete_new_password_challenge()
            .returning(|_| Ok(tokens_output()));

        let mut publisher = MockEventPublisher::new();
        let expected_id = user_id.clone();
        publisher
            .expect_publish()
            .withf(move |event| {
                event.event_name == "PasswordChanged"
                    && event.payload["email"] == "ana.ruiz@example.com"
                    && event.payload["aggregateId"] == expected_id.as_str()
            })
            .times(1)
            .returning(|_| {
                Ok(PublishedEvent {
                    message_id: "msg-1".to_string(),
                })
            });

        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            publisher,
        );

        let tokens = service
            .complete_new_password_challenge(NewPasswordChallenge {
                email: "ana.ruiz@example.com".to_string(),
                new_password: "N3w-secret!".to_string(),
                session: "session-token".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.refresh_token, "refresh");
        // Provider omitted expiresIn, the default applies.
        assert_eq!(tokens.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_complete_challenge_requires_full_token_triple() {
        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_email()
            .returning(|_| Ok(Some(record_with_status(UserStatus::Pending))));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_complete_new_password_challenge()
            .returning(|_| {
                Ok(AuthenticationOutput {
                    access_token: Some("access".to_string()),
                    id_token: Some("id".to_string()),
                    refresh_token: None,
                    ..Default::default()
                })
            });

        // No publish expectation: nothing may reach the bus.
        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service
            .complete_new_password_challenge(NewPasswordChallenge {
                email: "ana.ruiz@example.com".to_string(),
                new_password: "N3w-secret!".to_string(),
                session: "session-token".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Inconsistency { .. })));
    }

    #[tokio::test]
    async fn test_complete_challenge_publish_failure_propagates() {
        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_email()
            .returning(|_| Ok(Some(record_with_status(UserStatus::Pending))));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_complete_new_password_challenge()
            .returning(|_| Ok(tokens_output()));

        let mut publisher = MockEventPublisher::new();
        publisher
            .expect_publish()
            .returning(|_| Err(DomainError::messaging("topic unavailable")));

        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            publisher,
        );

        let result = service
            .complete_new_password_challenge(NewPasswordChallenge {
                email: "ana.ruiz@example.com".to_string(),
                new_password: "N3w-secret!".to_string(),
                session: "session-token".to_string(),
            })
            .await;

        assert!(matches!(result, Err(DomainError::Messaging { .. })));
    }

    // Refresh tokens

    #[tokio::test]
    async fn test_refresh_tokens_defaults_expiry() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_refresh_tokens().with(eq("refresh")).returning(|_| {
            Ok(AuthenticationOutput {
                access_token: Some("access".to_string()),
                id_token: Some("id".to_string()),
                ..Default::default()
            })
        });

        let service = service(
            identity,
            MockUserReader::new(),
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let tokens = service.refresh_tokens("refresh").await.unwrap();

        assert_eq!(tokens.access_token, "access");
        assert_eq!(tokens.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_refresh_tokens_keeps_provider_expiry() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_refresh_tokens().returning(|_| {
            Ok(AuthenticationOutput {
                access_token: Some("access".to_string()),
                id_token: Some("id".to_string()),
                expires_in: Some(900),
                ..Default::default()
            })
        });

        let service = service(
            identity,
            MockUserReader::new(),
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let tokens = service.refresh_tokens("refresh").await.unwrap();
        assert_eq!(tokens.expires_in, 900);
    }

    #[tokio::test]
    async fn test_refresh_tokens_requires_both_tokens() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_refresh_tokens().returning(|_| {
            Ok(AuthenticationOutput {
                access_token: Some("access".to_string()),
                ..Default::default()
            })
        });

        let service = service(
            identity,
            MockUserReader::new(),
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.refresh_tokens("refresh").await;
        assert!(matches!(result, Err(DomainError::Inconsistency { .. })));
    }

    // Activate / deactivate

    #[tokio::test]
    async fn test_activate_pending_user() {
        let record = record_with_status(UserStatus::Pending);
        let user_id = record.id;

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_check_exists()
            .withf(|lookup| {
                matches!(lookup, AuthUserLookup::ExternalAuthId(id) if id == "sub-123")
            })
            .returning(|_| Ok(true));

        let mut writer = MockUserWriter::new();
        writer
            .expect_update()
            .withf(move |update| update.id == user_id && update.status == 1)
            .times(1)
            .returning(move |_| Ok(record_with_status(UserStatus::Active)));

        let service = service(
            identity,
            reader,
            writer,
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let change = service.activate(&user_id.to_string()).await.unwrap();

        assert_eq!(change.status, "active");
        assert_eq!(change.id, user_id.to_string());
    }

    #[tokio::test]
    async fn test_activate_missing_user_hides_identifier() {
        let mut reader = MockUserReader::new();
        reader.expect_find_by_id().returning(|_| Ok(None));

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.activate(&Uuid::new_v4().to_string()).await;

        match result {
            Err(DomainError::EntityNotFound { message }) => {
                assert_eq!(message, "User not found");
            }
            other => panic!("expected EntityNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_activate_detects_provider_drift() {
        let record = record_with_status(UserStatus::Pending);

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(false));

        // No writer expectation: the store must never be written.
        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.activate(&Uuid::new_v4().to_string()).await;

        assert!(matches!(result, Err(DomainError::Inconsistency { .. })));
    }

    #[tokio::test]
    async fn test_activate_refuses_non_pending_user() {
        let record = record_with_status(UserStatus::Active);

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(true));

        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.activate(&Uuid::new_v4().to_string()).await;

        assert!(matches!(
            result,
            Err(DomainError::BusinessRuleViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_deactivate_active_user() {
        let record = record_with_status(UserStatus::Active);
        let user_id = record.id;

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(true));

        let mut writer = MockUserWriter::new();
        writer
            .expect_update()
            .withf(move |update| update.id == user_id && update.status == 2)
            .times(1)
            .returning(|_| Ok(record_with_status(UserStatus::Inactive)));

        let service = service(
            identity,
            reader,
            writer,
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let change = service.deactivate(&user_id.to_string()).await.unwrap();
        assert_eq!(change.status, "inactive");
    }

    #[tokio::test]
    async fn test_deactivate_refuses_pending_user() {
        let record = record_with_status(UserStatus::Pending);

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity.expect_check_exists().returning(|_| Ok(true));

        let service = service(
            identity,
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.deactivate(&Uuid::new_v4().to_string()).await;

        assert!(matches!(
            result,
            Err(DomainError::BusinessRuleViolation { .. })
        ));
    }

    // Update profile

    #[tokio::test]
    async fn test_update_writes_provider_then_store() {
        let record = record_with_status(UserStatus::Active);
        let user_id = record.id;

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));

        let mut identity = MockIdentityProvider::new();
        identity
            .expect_update()
            .withf(|input| {
                input.external_auth_id == "sub-123"
                    && input.full_name.as_deref() == Some("Ana María Ruiz")
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut writer = MockUserWriter::new();
        writer
            .expect_update()
            .withf(move |update| {
                update.id == user_id && update.full_name == "Ana María Ruiz"
            })
            .times(1)
            .returning(|_| Ok(record_with_status(UserStatus::Active)));

        let service = service(
            identity,
            reader,
            writer,
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let updated = service
            .update(
                &user_id.to_string(),
                UpdateProfileRequest {
                    full_name: Some("Ana María Ruiz".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name, "Ana María Ruiz");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let mut reader = MockUserReader::new();
        reader.expect_find_by_id().returning(|_| Ok(None));

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service
            .update(
                &Uuid::new_v4().to_string(),
                UpdateProfileRequest {
                    full_name: Some("Ana María Ruiz".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::EntityNotFound { .. })));
    }

    // Queries

    #[tokio::test]
    async fn test_get_by_id_projects_all_fields() {
        let record = record_with_status(UserStatus::Active);
        let user_id = record.id;

        let mut reader = MockUserReader::new();
        reader
            .expect_find_by_id()
            .returning(move |_| Ok(Some(record.clone())));

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let details = service.get_by_id(&user_id.to_string()).await.unwrap();

        assert_eq!(details.id, user_id.to_string());
        assert_eq!(details.email, "ana.ruiz@example.com");
        assert_eq!(details.status, "active");
        assert_eq!(details.external_auth_id, "sub-123");
    }

    #[tokio::test]
    async fn test_get_by_id_rejects_malformed_id() {
        let service = service(
            MockIdentityProvider::new(),
            MockUserReader::new(),
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.get_by_id("not-a-uuid").await;

        assert!(matches!(
            result,
            Err(DomainError::InvalidValueObject { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_by_email_miss_shows_identifier() {
        let mut reader = MockUserReader::new();
        reader.expect_find_by_email().returning(|_| Ok(None));

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let result = service.get_by_email("ghost@example.com").await;

        match result {
            Err(DomainError::EntityNotFound { message }) => {
                assert!(message.contains("ghost@example.com"));
            }
            other => panic!("expected EntityNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_computes_total_pages() {
        let mut reader = MockUserReader::new();
        reader
            .expect_find_all()
            .withf(|query| query.page == 2 && query.limit == 10)
            .returning(|_| {
                Ok(UserPage {
                    records: vec![],
                    total: 25,
                })
            });

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let list = service
            .list(ListUsersRequest {
                status: None,
                page: Some(2),
                limit: Some(10),
            })
            .await
            .unwrap();

        assert_eq!(list.pagination.total, 25);
        assert_eq!(list.pagination.total_pages, 3);
        assert_eq!(list.pagination.page, 2);
    }

    #[tokio::test]
    async fn test_list_applies_defaults() {
        let mut reader = MockUserReader::new();
        reader
            .expect_find_all()
            .withf(|query| query.page == 1 && query.limit == 10 && query.status.is_none())
            .returning(|_| {
                Ok(UserPage {
                    records: vec![record_with_status(UserStatus::Pending)],
                    total: 1,
                })
            });

        let service = service(
            MockIdentityProvider::new(),
            reader,
            MockUserWriter::new(),
            MockUserExistenceChecker::new(),
            MockEventPublisher::new(),
        );

        let list = service.list(ListUsersRequest::default()).await.unwrap();

        assert_eq!(list.users.len(), 1);
        assert_eq!(list.users[0].status, "pending");
        assert_eq!(list.pagination.total_pages, 1);
    }
}
