use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateUserInput, UpdateUserInput, UserResponse},
    error::UserResult,
    repo::UserRepository,
};
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route(
            "/users/:id",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

/// POST /users
#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserInput>,
) -> UserResult<impl IntoResponse> {
    let user = state.create_user.exec(payload).await?;
    let location = format!("/api/v1/users/{}", user.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

/// GET /users
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> UserResult<Json<Vec<UserResponse>>> {
    let users = state.users.list_all().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /users/:id
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> UserResult<Json<UserResponse>> {
    let user = state.users.get_by_id(id).await?;
    Ok(Json(user.into()))
}

/// PATCH /users/:id
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserInput>,
) -> UserResult<StatusCode> {
    state.update_user.exec(id, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/:id
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> UserResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
