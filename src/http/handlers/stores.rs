use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;

use crate::{
    auth::AuthIdentity,
    engine::{self, listing::StoreListQuery},
    errors::{AppError, ErrorBody},
    models::{
        page::{Page, PageRequest},
        store::{StoreId, StoreListing},
    },
    state::AppState,
};

pub async fn get_stores_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Query(query), _): WithRejection<Query<StoreListQuery>, AppError>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Page<StoreListing>>, (StatusCode, Json<ErrorBody>)> {
    let stores = engine::list_stores(&state, &identity, query, page)
        .await
        .map_err(|e| {
            tracing::error!("Error listing stores: {}", e);
            e.to_response()
        })?;

    Ok(Json(stores))
}

pub async fn get_store_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
) -> Result<Json<StoreListing>, (StatusCode, Json<ErrorBody>)> {
    let store = engine::get_store(&state, &identity, store_id)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching store {}: {}", store_id, e);
            e.to_response()
        })?;

    Ok(Json(store))
}

pub async fn get_my_stores_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<Vec<StoreListing>>, (StatusCode, Json<ErrorBody>)> {
    let stores = engine::owner_stores(&state, &identity).await.map_err(|e| {
        tracing::error!("Error listing owned stores: {}", e);
        e.to_response()
    })?;

    Ok(Json(stores))
}
