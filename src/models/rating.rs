use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{store::StoreId, user::UserId};

pub type RatingId = i64;

pub const MIN_SCORE: i16 = 1;
pub const MAX_SCORE: i16 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: RatingId,
    #[sqlx(rename = "user_id")]
    pub rater_id: UserId,
    pub store_id: StoreId,
    #[sqlx(rename = "rating")]
    #[serde(rename = "rating")]
    pub score: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedRating {
    pub rating: Rating,
    pub outcome: UpsertOutcome,
}

/// Which slice of the rating set a read should return.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingFilter {
    All,
    Store(StoreId),
    Rater(UserId),
    Stores(Vec<StoreId>),
}

impl RatingFilter {
    pub fn matches(&self, rating: &Rating) -> bool {
        match self {
            RatingFilter::All => true,
            RatingFilter::Store(id) => rating.store_id == *id,
            RatingFilter::Rater(id) => rating.rater_id == *id,
            RatingFilter::Stores(ids) => ids.contains(&rating.store_id),
        }
    }
}

/// A rating decorated with the names a privileged reader may see.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    #[serde(flatten)]
    pub rating: Rating,
    pub store_name: Option<String>,
    pub rater_name: Option<String>,
    pub rater_email: Option<String>,
}
