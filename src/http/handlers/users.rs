use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    auth::AuthIdentity,
    engine::{self, users::UserListQuery},
    errors::{AppError, ErrorBody},
    models::{
        page::{Page, PageRequest},
        user::{UserId, UserListing},
    },
    state::AppState,
};

pub async fn get_users_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Query(query), _): WithRejection<Query<UserListQuery>, AppError>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Page<UserListing>>, (StatusCode, Json<ErrorBody>)> {
    let users = engine::list_users(&state, &identity, query, page)
        .await
        .map_err(|e| {
            tracing::error!("Error listing users: {}", e);
            e.to_response()
        })?;

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Path(user_id), _): WithRejection<Path<UserId>, AppError>,
) -> Result<Json<UserListing>, (StatusCode, Json<ErrorBody>)> {
    let user = engine::get_user(&state, &identity, user_id)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching user {}: {}", user_id, e);
            e.to_response()
        })?;

    Ok(Json(user))
}
