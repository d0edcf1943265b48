use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;

use crate::{
    engine::{
        aggregation::{newest_first, store_stats},
        scope::{self, RaterVisibility},
    },
    errors::AppError,
    models::{
        Identity, Rating, Store, User,
        page::{Page, PageRequest, SortOrder},
        rating::{MAX_SCORE, MIN_SCORE, RatingEntry, RatingFilter, RatingId, SubmittedRating},
        stats::StoreStats,
        store::{StoreFilter, StoreId},
        user::UserId,
    },
    state::AppState,
};

/// Narrows a client-supplied score to the stored width.
pub fn validate_score(score: i64) -> Result<i16, AppError> {
    i16::try_from(score)
        .ok()
        .filter(|score| (MIN_SCORE..=MAX_SCORE).contains(score))
        .ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "Rating must be an integer between {MIN_SCORE} and {MAX_SCORE}, got {score}"
            ))
        })
}

/// Creates the caller's rating for a store, or replaces its score if one
/// already exists. The existence check and the write happen in one storage
/// operation, so concurrent submissions for the same pair leave one row.
pub async fn submit_rating(
    state: &AppState,
    rater: &Identity,
    store_id: StoreId,
    score: i64,
) -> Result<SubmittedRating, AppError> {
    scope::require_user(rater)?;
    scope::validate_id(store_id, "store")?;
    let score = validate_score(score)?;

    if state.directory.store(store_id).await?.is_none() {
        return Err(AppError::NotFound("Store not found".into()));
    }

    let submitted = state
        .ratings
        .upsert(rater.id, store_id, score, Utc::now())
        .await?;

    tracing::info!(
        "Rating {} {:?} by user {} for store {}: {}",
        submitted.rating.id,
        submitted.outcome,
        rater.id,
        store_id,
        score
    );

    Ok(submitted)
}

pub async fn delete_rating(
    state: &AppState,
    requester: &Identity,
    rating_id: RatingId,
) -> Result<(), AppError> {
    scope::validate_id(rating_id, "rating")?;

    let rating = state
        .ratings
        .find(rating_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".into()))?;

    scope::authorize_rating_delete(requester, &rating)?;

    // A concurrent delete may have won the race since the lookup.
    if !state.ratings.delete(rating_id).await? {
        return Err(AppError::NotFound("Rating not found".into()));
    }

    tracing::info!(
        "Rating {} deleted by {} {}",
        rating_id,
        requester.role,
        requester.id
    );

    Ok(())
}

pub async fn my_rating(
    state: &AppState,
    identity: &Identity,
    store_id: StoreId,
) -> Result<Option<Rating>, AppError> {
    scope::validate_id(store_id, "store")?;

    if state.directory.store(store_id).await?.is_none() {
        return Err(AppError::NotFound("Store not found".into()));
    }

    state.ratings.find_by_pair(identity.id, store_id).await
}

/// Decorates ratings with store and rater names. Rater details are left out
/// when the caller may not see who rated.
pub(crate) fn to_entries(
    ratings: Vec<Rating>,
    users: &HashMap<UserId, User>,
    stores: &HashMap<StoreId, Store>,
    visibility: RaterVisibility,
) -> Vec<RatingEntry> {
    ratings
        .into_iter()
        .map(|rating| {
            let store_name = stores.get(&rating.store_id).map(|store| store.name.clone());
            let rater = match visibility {
                RaterVisibility::Full => users.get(&rating.rater_id),
                RaterVisibility::Hidden => None,
            };
            RatingEntry {
                store_name,
                rater_name: rater.map(|user| user.name.clone()),
                rater_email: rater.map(|user| user.email.clone()),
                rating,
            }
        })
        .collect()
}

pub(crate) fn index_users(users: Vec<User>) -> HashMap<UserId, User> {
    users.into_iter().map(|user| (user.id, user)).collect()
}

pub(crate) fn index_stores(stores: Vec<Store>) -> HashMap<StoreId, Store> {
    stores.into_iter().map(|store| (store.id, store)).collect()
}

/// Individual ratings of one store, newest first.
pub async fn store_ratings(
    state: &AppState,
    identity: &Identity,
    store_id: StoreId,
    page: PageRequest,
) -> Result<Page<RatingEntry>, AppError> {
    page.validate()?;
    let grant = scope::authorize_store_ratings(state.directory.as_ref(), identity, store_id).await?;

    let rating_filter = grant.rating_filter();
    let (mut ratings, users) = futures::try_join!(
        state.ratings.list(&rating_filter),
        state.directory.users(),
    )?;
    ratings.sort_by(newest_first);

    let stores = index_stores(vec![grant.store().clone()]);
    let entries = to_entries(
        ratings,
        &index_users(users),
        &stores,
        scope::rater_visibility(identity),
    );

    page.paginate(entries)
}

pub async fn store_rating_stats(
    state: &AppState,
    identity: &Identity,
    store_id: StoreId,
) -> Result<StoreStats, AppError> {
    let grant = scope::authorize_store_ratings(state.directory.as_ref(), identity, store_id).await?;
    let ratings = state.ratings.list(&grant.rating_filter()).await?;

    Ok(store_stats(&ratings))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingSortKey {
    #[default]
    CreatedAt,
    Rating,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingListQuery {
    #[serde(default)]
    pub sort_by: RatingSortKey,
    #[serde(default = "descending")]
    pub sort_order: SortOrder,
}

fn descending() -> SortOrder {
    SortOrder::Desc
}

impl Default for RatingListQuery {
    fn default() -> Self {
        Self {
            sort_by: RatingSortKey::default(),
            sort_order: descending(),
        }
    }
}

/// Every rating on the platform, for admins.
pub async fn all_ratings(
    state: &AppState,
    identity: &Identity,
    query: RatingListQuery,
    page: PageRequest,
) -> Result<Page<RatingEntry>, AppError> {
    scope::require_admin(identity)?;
    page.validate()?;

    let all_ratings = RatingFilter::All;
    let all_stores = StoreFilter::default();
    let (mut ratings, users, stores) = futures::try_join!(
        state.ratings.list(&all_ratings),
        state.directory.users(),
        state.directory.stores(&all_stores),
    )?;

    ratings.sort_by(|a, b| {
        let ordering = match query.sort_by {
            RatingSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            RatingSortKey::Rating => a.score.cmp(&b.score),
        };
        query.sort_order.apply(ordering.then_with(|| a.id.cmp(&b.id)))
    });

    let entries = to_entries(
        ratings,
        &index_users(users),
        &index_stores(stores),
        RaterVisibility::Full,
    );

    page.paginate(entries)
}

#[cfg(test)]
mod tests {
    use super::validate_score;

    #[test]
    fn score_bounds_are_inclusive() {
        assert_eq!(validate_score(1).unwrap(), 1);
        assert_eq!(validate_score(5).unwrap(), 5);
        assert!(validate_score(0).is_err());
        assert!(validate_score(6).is_err());
        assert!(validate_score(-3).is_err());
    }

    #[test]
    fn scores_wider_than_storage_are_rejected() {
        assert!(validate_score(70_000).is_err());
        // Truncating 65541 to 16 bits would give 5.
        assert!(validate_score(65_541).is_err());
    }
}
