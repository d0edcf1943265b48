use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    auth::AuthIdentity,
    engine::{self, ratings::RatingListQuery},
    errors::{AppError, ErrorBody},
    models::{
        Rating,
        page::{Page, PageRequest},
        rating::{RatingEntry, RatingId, UpsertOutcome},
        stats::StoreStats,
        store::StoreId,
    },
    state::AppState,
};

type HandlerError = (StatusCode, Json<ErrorBody>);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingPayload {
    pub store_id: StoreId,
    pub rating: i64,
}

pub async fn submit_rating_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Json(payload), _): WithRejection<Json<SubmitRatingPayload>, AppError>,
) -> Result<(StatusCode, Json<Rating>), HandlerError> {
    let submitted = engine::submit_rating(&state, &identity, payload.store_id, payload.rating)
        .await
        .map_err(|e| {
            tracing::error!("Error submitting rating: {}", e);
            e.to_response()
        })?;

    let status = match submitted.outcome {
        UpsertOutcome::Created => StatusCode::CREATED,
        UpsertOutcome::Updated => StatusCode::OK,
    };
    Ok((status, Json(submitted.rating)))
}

pub async fn delete_rating_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Path(rating_id), _): WithRejection<Path<RatingId>, AppError>,
) -> Result<StatusCode, HandlerError> {
    engine::delete_rating(&state, &identity, rating_id)
        .await
        .map_err(|e| {
            tracing::error!("Error deleting rating {}: {}", rating_id, e);
            e.to_response()
        })?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_all_ratings_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Query(query), _): WithRejection<Query<RatingListQuery>, AppError>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Page<RatingEntry>>, HandlerError> {
    let ratings = engine::all_ratings(&state, &identity, query, page)
        .await
        .map_err(|e| {
            tracing::error!("Error listing ratings: {}", e);
            e.to_response()
        })?;

    Ok(Json(ratings))
}

pub async fn get_store_ratings_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
    WithRejection(Query(page), _): WithRejection<Query<PageRequest>, AppError>,
) -> Result<Json<Page<RatingEntry>>, HandlerError> {
    let ratings = engine::store_ratings(&state, &identity, store_id, page)
        .await
        .map_err(|e| {
            tracing::error!("Error listing ratings for store {}: {}", store_id, e);
            e.to_response()
        })?;

    Ok(Json(ratings))
}

pub async fn get_store_rating_stats_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
) -> Result<Json<StoreStats>, HandlerError> {
    let stats = engine::store_rating_stats(&state, &identity, store_id)
        .await
        .map_err(|e| {
            tracing::error!("Error computing stats for store {}: {}", store_id, e);
            e.to_response()
        })?;

    Ok(Json(stats))
}

pub async fn get_my_rating_handler(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    WithRejection(Path(store_id), _): WithRejection<Path<StoreId>, AppError>,
) -> Result<Json<Option<Rating>>, HandlerError> {
    let rating = engine::my_rating(&state, &identity, store_id)
        .await
        .map_err(|e| {
            tracing::error!("Error fetching own rating for store {}: {}", store_id, e);
            e.to_response()
        })?;

    Ok(Json(rating))
}
