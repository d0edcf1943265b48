use sqlx::PgPool;

use crate::{
    errors::AppError,
    models::{
        Store,
        store::{StoreFilter, StoreId},
    },
};

/// Turns user text into an `ILIKE` pattern that matches it literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

pub async fn get_store_by_id(id: StoreId, postgres: &PgPool) -> Result<Option<Store>, AppError> {
    let store = sqlx::query_as::<_, Store>(
        "SELECT id, name, email, address, owner_id, created_at FROM stores WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(postgres)
    .await?;

    Ok(store)
}

pub async fn get_stores(filter: &StoreFilter, postgres: &PgPool) -> Result<Vec<Store>, AppError> {
    let stores = sqlx::query_as::<_, Store>(
        "SELECT id, name, email, address, owner_id, created_at
        FROM stores
        WHERE ($1::text IS NULL OR name ILIKE $1)
            AND ($2::text IS NULL OR address ILIKE $2)
            AND ($3::bigint IS NULL OR owner_id = $3)
        ORDER BY id",
    )
    .bind(filter.name.as_deref().map(like_pattern))
    .bind(filter.address.as_deref().map(like_pattern))
    .bind(filter.owner_id)
    .fetch_all(postgres)
    .await?;

    Ok(stores)
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("bakery"), "%bakery%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
