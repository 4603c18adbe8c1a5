//! User Identity API
//!
//! Manages the user identity lifecycle - registration, authentication,
//! profile updates, activation/deactivation and credential rotation -
//! keeping a relational store, an AWS Cognito user pool and an SNS topic
//! consistent through explicit orchestration and compensation.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use aws_config::BehaviorVersion;
use tracing::info;

use api::state::AppState;
use domain::DomainError;
use infrastructure::auth::CognitoIdentityProvider;
use infrastructure::messaging::SnsEventPublisher;
use infrastructure::user::{PostgresUserStore, UserService};

/// Create the application state with every collaborator wired explicitly
///
/// The configuration object is the only source of settings; adapters
/// receive what they need through their constructors.
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    validate_config(config)?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let cognito_client = aws_sdk_cognitoidentityprovider::Client::new(&aws_config);
    let sns_client = aws_sdk_sns::Client::new(&aws_config);

    info!("Connecting to PostgreSQL...");
    let pool = sqlx::PgPool::connect(&config.database.url)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run database migrations: {}", e))?;
    info!("PostgreSQL connection established");

    let identity_provider = Arc::new(CognitoIdentityProvider::new(
        cognito_client,
        &config.cognito,
    ));
    let store = Arc::new(PostgresUserStore::new(pool));
    let event_publisher = Arc::new(SnsEventPublisher::new(sns_client, &config.messaging));

    let user_service = Arc::new(UserService::new(
        identity_provider,
        store.clone(),
        store.clone(),
        store,
        event_publisher,
    ));

    Ok(AppState::new(user_service))
}

fn validate_config(config: &AppConfig) -> Result<(), DomainError> {
    if config.database.url.is_empty() {
        return Err(DomainError::configuration(
            "database.url is required (APP__DATABASE__URL)",
        ));
    }

    if config.cognito.user_pool_id.is_empty() || config.cognito.client_id.is_empty() {
        return Err(DomainError::configuration(
            "cognito.user_pool_id and cognito.client_id are required",
        ));
    }

    if config.messaging.topic_arn.is_empty() {
        return Err(DomainError::configuration(
            "messaging.topic_arn is required (APP__MESSAGING__TOPIC_ARN)",
        ));
    }

    Ok(())
}
