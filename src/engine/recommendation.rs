//! Per-user candidate lists: stores worth visiting (`recommended`) and
//! popular stores the user has not weighed in on yet (`needs_rating`).

use std::collections::HashSet;

use crate::{
    engine::{
        aggregation::{quality_order, rank, stats_by_store},
        scope,
    },
    errors::AppError,
    models::{
        Identity, Rating, Store,
        rating::RatingFilter,
        stats::RankedStore,
        store::{StoreFilter, StoreId},
        user::UserId,
    },
    state::AppState,
};

/// Thresholds for both candidate lists. Recommendation needs a minimum
/// sample size and a minimum quality bar; needs-rating only a sample size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationPolicy {
    pub recommend_min_count: u64,
    pub recommend_min_average: f64,
    pub needs_rating_min_count: u64,
}

impl Default for RecommendationPolicy {
    fn default() -> Self {
        Self {
            recommend_min_count: 3,
            recommend_min_average: 4.0,
            needs_rating_min_count: 5,
        }
    }
}

/// Stores `user_id` has never rated, with their live aggregates.
fn unrated_by(user_id: UserId, stores: &[Store], ratings: &[Rating]) -> Vec<RankedStore> {
    let rated: HashSet<StoreId> = ratings
        .iter()
        .filter(|rating| rating.rater_id == user_id)
        .map(|rating| rating.store_id)
        .collect();
    let by_store = stats_by_store(ratings);

    stores
        .iter()
        .filter(|store| !rated.contains(&store.id))
        .map(|store| {
            let stats = by_store.get(&store.id).copied().unwrap_or_default();
            rank(store, &stats)
        })
        .collect()
}

pub fn select_recommended(
    user_id: UserId,
    stores: &[Store],
    ratings: &[Rating],
    policy: &RecommendationPolicy,
    limit: usize,
) -> Vec<RankedStore> {
    let mut candidates: Vec<RankedStore> = unrated_by(user_id, stores, ratings)
        .into_iter()
        .filter(|candidate| {
            candidate.count >= policy.recommend_min_count
                && candidate.average.at_least(policy.recommend_min_average)
        })
        .collect();

    candidates.sort_by(quality_order);
    candidates.truncate(limit);
    candidates
}

pub fn select_needs_rating(
    user_id: UserId,
    stores: &[Store],
    ratings: &[Rating],
    policy: &RecommendationPolicy,
    limit: usize,
) -> Vec<RankedStore> {
    let mut candidates: Vec<RankedStore> = unrated_by(user_id, stores, ratings)
        .into_iter()
        .filter(|candidate| candidate.count >= policy.needs_rating_min_count.max(1))
        .collect();

    candidates.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.store.id.cmp(&b.store.id)));
    candidates.truncate(limit);
    candidates
}

async fn snapshot(state: &AppState) -> Result<(Vec<Store>, Vec<Rating>), AppError> {
    let all_stores = StoreFilter::default();
    let all_ratings = RatingFilter::All;
    futures::try_join!(
        state.directory.stores(&all_stores),
        state.ratings.list(&all_ratings),
    )
}

/// Reads current storage on every call, so a rating committed before the
/// call is always honoured.
pub async fn recommended(
    state: &AppState,
    identity: &Identity,
    limit: usize,
) -> Result<Vec<RankedStore>, AppError> {
    scope::require_user(identity)?;
    let (stores, ratings) = snapshot(state).await?;
    Ok(select_recommended(
        identity.id,
        &stores,
        &ratings,
        &state.policy,
        limit,
    ))
}

pub async fn needs_rating(
    state: &AppState,
    identity: &Identity,
    limit: usize,
) -> Result<Vec<RankedStore>, AppError> {
    scope::require_user(identity)?;
    let (stores, ratings) = snapshot(state).await?;
    Ok(select_needs_rating(
        identity.id,
        &stores,
        &ratings,
        &state.policy,
        limit,
    ))
}
