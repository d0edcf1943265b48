use sqlx::PgPool;

use crate::{errors::AppError, models::rating::RatingId};

pub async fn delete_rating(id: RatingId, postgres: &PgPool) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
        .bind(id)
        .execute(postgres)
        .await?;

    Ok(result.rows_affected() > 0)
}
