//! AWS Cognito implementation of the identity-provider contract

use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::ProvideErrorMetadata;
use aws_sdk_cognitoidentityprovider::types::{
    AttributeType, AuthFlowType, AuthenticationResultType, ChallengeNameType, DeliveryMediumType,
};
use aws_sdk_cognitoidentityprovider::Client;
use tracing::debug;

use super::secret_hash::SecretHashCalculator;
use crate::config::CognitoConfig;
use crate::domain::auth::{
    AuthUserLookup, AuthenticationOutput, CreateAuthUser, CreatedAuthUser, Credentials,
    IdentityProvider, NewPasswordChallenge, UpdateAuthUser,
};
use crate::domain::DomainError;

/// Cognito-backed identity provider
///
/// Users are keyed by email; the Cognito `sub` attribute becomes the
/// external auth ID the rest of the system carries around.
pub struct CognitoIdentityProvider {
    client: Client,
    user_pool_id: String,
    client_id: String,
    client_secret: String,
}

impl CognitoIdentityProvider {
    pub fn new(client: Client, config: &CognitoConfig) -> Self {
        Self {
            client,
            user_pool_id: config.user_pool_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    fn secret_hash(&self, username: &str) -> String {
        SecretHashCalculator::calculate(username, &self.client_id, &self.client_secret)
    }
}

/// Translate Cognito error codes onto the domain taxonomy
fn map_provider_error(action: &str, err: impl ProvideErrorMetadata) -> DomainError {
    let code = err.code().unwrap_or_default();
    let message = err.message().unwrap_or("no error detail").to_string();

    match code {
        "NotAuthorizedException" => {
            DomainError::credentials_rejected("invalid credentials for the requested operation")
        }
        "UserNotFoundException" => DomainError::entity_not_found("User"),
        "UsernameExistsException" | "AliasExistsException" => DomainError::DuplicateEntity {
            message: "email is already registered with the identity provider".to_string(),
        },
        "InvalidPasswordException" => {
            DomainError::provider("password does not meet the security policy")
        }
        "TooManyRequestsException" | "LimitExceededException" => {
            DomainError::provider(format!("rate limited while trying to {action}"))
        }
        _ => DomainError::provider(format!("failed to {action}: {message}")),
    }
}

fn attribute(name: &str, value: &str) -> Result<AttributeType, DomainError> {
    AttributeType::builder()
        .name(name)
        .value(value)
        .build()
        .map_err(|e| DomainError::provider(format!("invalid user attribute '{name}': {e}")))
}

fn to_authentication_output(result: Option<&AuthenticationResultType>) -> AuthenticationOutput {
    let Some(result) = result else {
        return AuthenticationOutput::default();
    };

    AuthenticationOutput {
        access_token: result.access_token().map(str::to_string),
        id_token: result.id_token().map(str::to_string),
        refresh_token: result.refresh_token().map(str::to_string),
        expires_in: (result.expires_in() > 0).then(|| i64::from(result.expires_in())),
        ..Default::default()
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn check_exists(&self, lookup: AuthUserLookup) -> Result<bool, DomainError> {
        let username = match lookup {
            AuthUserLookup::Email(email) => email,
            AuthUserLookup::ExternalAuthId(id) => id,
        };

        let result = self
            .client
            .admin_get_user()
            .user_pool_id(&self.user_pool_id)
            .username(username)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();

                if service_err.is_user_not_found_exception() {
                    Ok(false)
                } else {
                    Err(map_provider_error("check user existence", service_err))
                }
            }
        }
    }

    async fn create(&self, input: CreateAuthUser) -> Result<CreatedAuthUser, DomainError> {
        debug!(email = %input.email, "creating identity-provider user");

        let response = self
            .client
            .admin_create_user()
            .user_pool_id(&self.user_pool_id)
            .username(&input.email)
            .user_attributes(attribute("email", &input.email)?)
            .user_attributes(attribute("email_verified", "true")?)
            .user_attributes(attribute("name", &input.full_name)?)
            .desired_delivery_mediums(DeliveryMediumType::Email)
            .send()
            .await
            .map_err(|err| map_provider_error("create user", err.into_service_error()))?;

        let external_auth_id = response
            .user()
            .map(|user| user.attributes())
            .unwrap_or_default()
            .iter()
            .find(|attr| attr.name() == "sub")
            .and_then(|attr| attr.value())
            .ok_or_else(|| {
                DomainError::provider("identity provider did not return a user id")
            })?
            .to_string();

        Ok(CreatedAuthUser { external_auth_id })
    }

    async fn update(&self, input: UpdateAuthUser) -> Result<(), DomainError> {
        let Some(full_name) = input.full_name else {
            return Ok(());
        };

        self.client
            .admin_update_user_attributes()
            .user_pool_id(&self.user_pool_id)
            .username(&input.external_auth_id)
            .user_attributes(attribute("name", &full_name)?)
            .send()
            .await
            .map_err(|err| map_provider_error("update user", err.into_service_error()))?;

        Ok(())
    }

    async fn remove(&self, external_auth_id: &str) -> Result<(), DomainError> {
        self.client
            .admin_delete_user()
            .user_pool_id(&self.user_pool_id)
            .username(external_auth_id)
            .send()
            .await
            .map_err(|err| map_provider_error("delete user", err.into_service_error()))?;

        Ok(())
    }

    async fn authenticate(
        &self,
        credentials: Credentials,
    ) -> Result<AuthenticationOutput, DomainError> {
        let response = self
            .client
            .initiate_auth()
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::UserPasswordAuth)
            .auth_parameters("USERNAME", &credentials.email)
            .auth_parameters("PASSWORD", &credentials.password)
            .auth_parameters("SECRET_HASH", self.secret_hash(&credentials.email))
            .send()
            .await
            .map_err(|err| map_provider_error("authenticate user", err.into_service_error()))?;

        if matches!(
            response.challenge_name(),
            Some(ChallengeNameType::NewPasswordRequired)
        ) {
            return Ok(AuthenticationOutput {
                challenge_name: response.challenge_name().map(|c| c.as_str().to_string()),
                session: response.session().map(str::to_string),
                ..Default::default()
            });
        }

        Ok(to_authentication_output(response.authentication_result()))
    }

    async fn complete_new_password_challenge(
        &self,
        input: NewPasswordChallenge,
    ) -> Result<AuthenticationOutput, DomainError> {
        let response = self
            .client
            .respond_to_auth_challenge()
            .client_id(&self.client_id)
            .challenge_name(ChallengeNameType::NewPasswordRequired)
            .session(&input.session)
            .challenge_responses("USERNAME", &input.email)
            .challenge_responses("NEW_PASSWORD", &input.new_password)
            .challenge_responses("SECRET_HASH", self.secret_hash(&input.email))
            .send()
            .await
            .map_err(|err| {
                map_provider_error("complete password challenge", err.into_service_error())
            })?;

        Ok(to_authentication_output(response.authentication_result()))
    }

    async fn refresh_tokens(
        &self,
        refresh_token: &str,
    ) -> Result<AuthenticationOutput, DomainError> {
        let response = self
            .client
            .initiate_auth()
            .client_id(&self.client_id)
            .auth_flow(AuthFlowType::RefreshTokenAuth)
            .auth_parameters("REFRESH_TOKEN", refresh_token)
            .send()
            .await
            .map_err(|err| map_provider_error("refresh tokens", err.into_service_error()))?;

        Ok(to_authentication_output(response.authentication_result()))
    }
}
