use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::{
    errors::AppError,
    models::{
        Rating,
        rating::{SubmittedRating, UpsertOutcome},
        store::StoreId,
        user::UserId,
    },
};

#[derive(FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    rating: Rating,
    inserted: bool,
}

/// Single-statement upsert keyed by the `(user_id, store_id)` unique
/// constraint. Concurrent callers serialize on the conflicting index entry,
/// so a pair can never end up with two rows.
pub async fn upsert_rating(
    rater_id: UserId,
    store_id: StoreId,
    score: i16,
    at: DateTime<Utc>,
    postgres: &PgPool,
) -> Result<SubmittedRating, AppError> {
    // xmax is zero only on a freshly inserted tuple.
    let row = sqlx::query_as::<_, UpsertRow>(
        "INSERT INTO ratings (user_id, store_id, rating, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $4)
        ON CONFLICT (user_id, store_id)
        DO UPDATE SET rating = EXCLUDED.rating, updated_at = EXCLUDED.updated_at
        RETURNING id, user_id, store_id, rating, created_at, updated_at, (xmax = 0) AS inserted",
    )
    .bind(rater_id)
    .bind(store_id)
    .bind(score)
    .bind(at)
    .fetch_one(postgres)
    .await?;

    let outcome = if row.inserted {
        UpsertOutcome::Created
    } else {
        UpsertOutcome::Updated
    };

    Ok(SubmittedRating {
        rating: row.rating,
        outcome,
    })
}
