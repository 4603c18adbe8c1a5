//! User management endpoints
//!
//! Handlers parse the request, delegate to the lifecycle service and map the
//! result; no business logic lives here.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::UserStatus;
use crate::infrastructure::user::{
    ListUsersRequest, RegisterUserRequest, RegisteredUser, StatusChange, UpdateProfileRequest,
    UpdatedProfile, UserDetails,
};

/// Create the users router
pub fn create_users_router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(list_users))
        .route("/{id}", get(get_user_by_id).patch(update_user))
        .route("/{id}/activate", post(activate_user))
        .route("/{id}/deactivate", post(deactivate_user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterUserBody {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 100))]
    pub full_name: String,
}

/// POST /v1/users
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterUserBody>,
) -> Result<(StatusCode, Json<RegisteredUser>), ApiError> {
    body.validate()?;

    let registered = state
        .user_service
        .register(RegisterUserRequest {
            email: body.email,
            full_name: body.full_name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(registered)))
}

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub email: Option<String>,
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /v1/users
///
/// With `?email=` this is a single-user lookup; otherwise a paged listing.
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Response, ApiError> {
    if let Some(email) = query.email {
        let details = state.user_service.get_by_email(&email).await?;
        return Ok(Json(details).into_response());
    }

    let status = query
        .status
        .as_deref()
        .map(str::parse::<UserStatus>)
        .transpose()?;

    let list = state
        .user_service
        .list(ListUsersRequest {
            status,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(list).into_response())
}

/// GET /v1/users/{id}
async fn get_user_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetails>, ApiError> {
    let details = state.user_service.get_by_id(&id).await?;
    Ok(Json(details))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserBody {
    #[validate(length(min = 2, max = 100))]
    pub full_name: Option<String>,
}

/// PATCH /v1/users/{id}
async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserBody>,
) -> Result<Json<UpdatedProfile>, ApiError> {
    body.validate()?;

    let updated = state
        .user_service
        .update(
            &id,
            UpdateProfileRequest {
                full_name: body.full_name,
            },
        )
        .await?;

    Ok(Json(updated))
}

/// POST /v1/users/{id}/activate
async fn activate_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusChange>, ApiError> {
    let change = state.user_service.activate(&id).await?;
    Ok(Json(change))
}

/// POST /v1/users/{id}/deactivate
async fn deactivate_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusChange>, ApiError> {
    let change = state.user_service.deactivate(&id).await?;
    Ok(Json(change))
}
