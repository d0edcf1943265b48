use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    db::{Directory, RatingStore, rating, store, user},
    errors::AppError,
    models::{
        Rating, Store, User,
        rating::{RatingFilter, RatingId, SubmittedRating},
        store::{StoreFilter, StoreId},
        user::UserId,
    },
};

/// PostgreSQL-backed ratings plus read access to the user and store tables.
#[derive(Clone)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Connected to PostgreSQL and applied migrations");

        Ok(Self { pool })
    }
}

#[async_trait]
impl RatingStore for PgStorage {
    async fn upsert(
        &self,
        rater_id: UserId,
        store_id: StoreId,
        score: i16,
        at: DateTime<Utc>,
    ) -> Result<SubmittedRating, AppError> {
        rating::upsert_rating(rater_id, store_id, score, at, &self.pool).await
    }

    async fn find(&self, id: RatingId) -> Result<Option<Rating>, AppError> {
        rating::get_rating_by_id(id, &self.pool).await
    }

    async fn find_by_pair(
        &self,
        rater_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, AppError> {
        rating::get_rating_by_pair(rater_id, store_id, &self.pool).await
    }

    async fn list(&self, filter: &RatingFilter) -> Result<Vec<Rating>, AppError> {
        rating::get_ratings(filter, &self.pool).await
    }

    async fn count(&self) -> Result<u64, AppError> {
        rating::count_ratings(&self.pool).await
    }

    async fn delete(&self, id: RatingId) -> Result<bool, AppError> {
        rating::delete_rating(id, &self.pool).await
    }
}

#[async_trait]
impl Directory for PgStorage {
    async fn store(&self, id: StoreId) -> Result<Option<Store>, AppError> {
        store::get_store_by_id(id, &self.pool).await
    }

    async fn stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, AppError> {
        store::get_stores(filter, &self.pool).await
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, AppError> {
        user::get_user_by_id(id, &self.pool).await
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        user::get_all_users(&self.pool).await
    }
}
