//! Authentication endpoints

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::auth::{AuthenticationOutput, Credentials, NewPasswordChallenge};
use crate::infrastructure::user::{IssuedTokens, RefreshedTokens};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/challenge", post(complete_challenge))
        .route("/refresh", post(refresh))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /v1/auth/login
///
/// Returns the provider result verbatim: either a token set or a
/// challenge (name + session) the client must answer.
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthenticationOutput>, ApiError> {
    body.validate()?;

    let output = state
        .user_service
        .authenticate(Credentials {
            email: body.email,
            password: body.password,
        })
        .await?;

    Ok(Json(output))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompleteChallengeBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub new_password: String,
    #[validate(length(min = 1))]
    pub session: String,
}

/// POST /v1/auth/challenge
async fn complete_challenge(
    State(state): State<AppState>,
    Json(body): Json<CompleteChallengeBody>,
) -> Result<Json<IssuedTokens>, ApiError> {
    body.validate()?;

    let tokens = state
        .user_service
        .complete_new_password_challenge(NewPasswordChallenge {
            email: body.email,
            new_password: body.new_password,
            session: body.session,
        })
        .await?;

    Ok(Json(tokens))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshBody {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// POST /v1/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<RefreshedTokens>, ApiError> {
    body.validate()?;

    let tokens = state.user_service.refresh_tokens(&body.refresh_token).await?;

    Ok(Json(tokens))
}
