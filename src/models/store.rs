use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::{stats::Average, user::UserId};

pub type StoreId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Substring filter handed to the storage collaborator. Matching is
/// case-insensitive and happens in storage, not in the engine.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    pub name: Option<String>,
    pub address: Option<String>,
    pub owner_id: Option<UserId>,
}

impl StoreFilter {
    pub fn owned_by(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Default::default()
        }
    }
}

/// A catalog row decorated with live aggregates and the caller's own score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    #[serde(flatten)]
    pub store: Store,
    pub average_rating: Average,
    pub total_ratings: u64,
    pub user_rating: Option<i16>,
}
