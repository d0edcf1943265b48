use axum::{Json, extract::State, http::StatusCode};

use crate::{
    auth::AuthIdentity,
    engine,
    errors::ErrorBody,
    models::dashboard::{AdminDashboard, Dashboard, StoreOwnerDashboard, UserDashboard},
    state::AppState,
};

/// Picks the dashboard matching the caller's role.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<Dashboard>, (StatusCode, Json<ErrorBody>)> {
    let dashboard = engine::dashboard_for(&state, &identity)
        .await
        .map_err(|e| {
            tracing::error!("Error building dashboard: {}", e);
            e.to_response()
        })?;

    Ok(Json(dashboard))
}

pub async fn admin_dashboard_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<AdminDashboard>, (StatusCode, Json<ErrorBody>)> {
    let dashboard = engine::admin_dashboard(&state, &identity)
        .await
        .map_err(|e| {
            tracing::error!("Error building admin dashboard: {}", e);
            e.to_response()
        })?;

    Ok(Json(dashboard))
}

pub async fn store_owner_dashboard_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<StoreOwnerDashboard>, (StatusCode, Json<ErrorBody>)> {
    let dashboard = engine::store_owner_dashboard(&state, &identity)
        .await
        .map_err(|e| {
            tracing::error!("Error building store owner dashboard: {}", e);
            e.to_response()
        })?;

    Ok(Json(dashboard))
}

pub async fn user_dashboard_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<UserDashboard>, (StatusCode, Json<ErrorBody>)> {
    let dashboard = engine::user_dashboard(&state, &identity)
        .await
        .map_err(|e| {
            tracing::error!("Error building user dashboard: {}", e);
            e.to_response()
        })?;

    Ok(Json(dashboard))
}
