use sqlx::PgPool;

use crate::{
    errors::AppError,
    models::{
        Rating,
        rating::{RatingFilter, RatingId},
        store::StoreId,
        user::UserId,
    },
};

const RATING_COLUMNS: &str = "id, user_id, store_id, rating, created_at, updated_at";

pub async fn get_rating_by_id(id: RatingId, postgres: &PgPool) -> Result<Option<Rating>, AppError> {
    let rating = sqlx::query_as::<_, Rating>(&format!(
        "SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(postgres)
    .await?;

    Ok(rating)
}

pub async fn get_rating_by_pair(
    rater_id: UserId,
    store_id: StoreId,
    postgres: &PgPool,
) -> Result<Option<Rating>, AppError> {
    let rating = sqlx::query_as::<_, Rating>(&format!(
        "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND store_id = $2"
    ))
    .bind(rater_id)
    .bind(store_id)
    .fetch_optional(postgres)
    .await?;

    Ok(rating)
}

pub async fn get_ratings(filter: &RatingFilter, postgres: &PgPool) -> Result<Vec<Rating>, AppError> {
    let ratings = match filter {
        RatingFilter::All => {
            sqlx::query_as::<_, Rating>(&format!(
                "SELECT {RATING_COLUMNS} FROM ratings ORDER BY id"
            ))
            .fetch_all(postgres)
            .await?
        }
        RatingFilter::Store(store_id) => {
            sqlx::query_as::<_, Rating>(&format!(
                "SELECT {RATING_COLUMNS} FROM ratings WHERE store_id = $1 ORDER BY id"
            ))
            .bind(store_id)
            .fetch_all(postgres)
            .await?
        }
        RatingFilter::Rater(rater_id) => {
            sqlx::query_as::<_, Rating>(&format!(
                "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 ORDER BY id"
            ))
            .bind(rater_id)
            .fetch_all(postgres)
            .await?
        }
        RatingFilter::Stores(store_ids) => {
            if store_ids.is_empty() {
                return Ok(Vec::new());
            }
            sqlx::query_as::<_, Rating>(&format!(
                "SELECT {RATING_COLUMNS} FROM ratings WHERE store_id = ANY($1) ORDER BY id"
            ))
            .bind(store_ids.as_slice())
            .fetch_all(postgres)
            .await?
        }
    };

    Ok(ratings)
}

pub async fn count_ratings(postgres: &PgPool) -> Result<u64, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings")
        .fetch_one(postgres)
        .await?;

    Ok(u64::try_from(count).unwrap_or_default())
}
