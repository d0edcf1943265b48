use sqlx::PgPool;

use crate::{
    errors::AppError,
    models::{
        User,
        user::{UserId, UserRow},
    },
};

pub async fn get_user_by_id(user_id: UserId, postgres: &PgPool) -> Result<Option<User>, AppError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(postgres)
    .await?;

    row.map(User::try_from).transpose()
}

pub async fn get_all_users(postgres: &PgPool) -> Result<Vec<User>, AppError> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, name, email, role, created_at FROM users ORDER BY id",
    )
    .fetch_all(postgres)
    .await?;

    rows.into_iter().map(User::try_from).collect()
}
