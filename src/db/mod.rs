//! Storage ports and their backends.
//!
//! [`RatingStore`] is the only writer of rating rows and owns the
//! one-rating-per-(rater, store) invariant. [`Directory`] is a read-only view
//! of the user and store master records, which are maintained elsewhere.

pub mod memory;
pub mod postgres;
pub mod rating;
pub mod seed;
pub mod store;
pub mod user;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    errors::AppError,
    models::{
        Rating, Store, User,
        rating::{RatingFilter, RatingId, SubmittedRating},
        store::{StoreFilter, StoreId},
        user::UserId,
    },
};

pub use memory::{MemoryDirectory, MemoryRatingStore};
pub use postgres::PgStorage;
pub use seed::Seed;

#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Inserts or replaces the rater's score for a store as one atomic step.
    /// A replacement keeps `id` and `created_at` and moves `updated_at` to `at`.
    async fn upsert(
        &self,
        rater_id: UserId,
        store_id: StoreId,
        score: i16,
        at: DateTime<Utc>,
    ) -> Result<SubmittedRating, AppError>;

    async fn find(&self, id: RatingId) -> Result<Option<Rating>, AppError>;

    async fn find_by_pair(
        &self,
        rater_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, AppError>;

    async fn list(&self, filter: &RatingFilter) -> Result<Vec<Rating>, AppError>;

    async fn count(&self) -> Result<u64, AppError>;

    /// Returns `false` when no row with that id existed.
    async fn delete(&self, id: RatingId) -> Result<bool, AppError>;
}

#[async_trait]
pub trait Directory: Send + Sync {
    async fn store(&self, id: StoreId) -> Result<Option<Store>, AppError>;

    async fn stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, AppError>;

    async fn user(&self, id: UserId) -> Result<Option<User>, AppError>;

    async fn users(&self) -> Result<Vec<User>, AppError>;
}

pub type SharedRatingStore = Arc<dyn RatingStore>;
pub type SharedDirectory = Arc<dyn Directory>;
