//! Store catalog rows with live aggregates and the caller's own score.

use std::{cmp::Ordering, collections::HashMap};

use serde::Deserialize;

use crate::{
    engine::{
        aggregation::{stats_by_store, stats_for},
        scope,
    },
    errors::AppError,
    models::{
        Identity, Rating, Store,
        page::{Page, PageRequest, SortOrder},
        rating::RatingFilter,
        stats::StoreStats,
        store::{StoreFilter, StoreId, StoreListing},
    },
    state::AppState,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSortKey {
    #[default]
    Name,
    Address,
    AverageRating,
    CreatedAt,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub address: Option<String>,
    #[serde(default)]
    pub sort_by: StoreSortKey,
    #[serde(default)]
    pub sort_order: SortOrder,
}

fn listing(store: Store, stats: &StoreStats, user_rating: Option<i16>) -> StoreListing {
    StoreListing {
        store,
        average_rating: stats.average,
        total_ratings: stats.count,
        user_rating,
    }
}

fn compare(a: &StoreListing, b: &StoreListing, key: StoreSortKey) -> Ordering {
    match key {
        StoreSortKey::Name => a.store.name.cmp(&b.store.name),
        StoreSortKey::Address => a.store.address.cmp(&b.store.address),
        StoreSortKey::AverageRating => a.average_rating.cmp(&b.average_rating),
        StoreSortKey::CreatedAt => a.store.created_at.cmp(&b.store.created_at),
    }
}

fn own_scores(identity: &Identity, ratings: &[Rating]) -> HashMap<StoreId, i16> {
    let own = scope::own_ratings(identity);
    ratings
        .iter()
        .filter(|rating| own.matches(rating))
        .map(|rating| (rating.store_id, rating.score))
        .collect()
}

/// Build listings for `stores` from a ratings snapshot.
pub fn build_listings(
    identity: &Identity,
    stores: Vec<Store>,
    ratings: &[Rating],
) -> Vec<StoreListing> {
    let by_store = stats_by_store(ratings);
    let own = own_scores(identity, ratings);

    stores
        .into_iter()
        .map(|store| {
            let stats = stats_for(&by_store, store.id);
            let user_rating = own.get(&store.id).copied();
            listing(store, &stats, user_rating)
        })
        .collect()
}

pub async fn list_stores(
    state: &AppState,
    identity: &Identity,
    query: StoreListQuery,
    page: PageRequest,
) -> Result<Page<StoreListing>, AppError> {
    page.validate()?;

    let scope = scope::aggregate_scope(state.directory.as_ref(), identity).await?;
    let mut filter = scope.store_filter(identity);
    filter.name = query.name.filter(|name| !name.trim().is_empty());
    filter.address = query.address.filter(|address| !address.trim().is_empty());

    // Own ratings must be present even when the aggregate scope is narrow.
    let all_ratings = RatingFilter::All;
    let (stores, ratings) = futures::try_join!(
        state.directory.stores(&filter),
        state.ratings.list(&all_ratings),
    )?;

    let stores: Vec<Store> = stores
        .into_iter()
        .filter(|store| scope.permits(store.id))
        .collect();
    let mut listings = build_listings(identity, stores, &ratings);

    listings.sort_by(|a, b| {
        query
            .sort_order
            .apply(compare(a, b, query.sort_by))
            .then_with(|| a.store.id.cmp(&b.store.id))
    });

    page.paginate(listings)
}

pub async fn get_store(
    state: &AppState,
    identity: &Identity,
    store_id: StoreId,
) -> Result<StoreListing, AppError> {
    scope::validate_id(store_id, "store")?;

    let store = state
        .directory
        .store(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".into()))?;

    let scope = scope::aggregate_scope(state.directory.as_ref(), identity).await?;
    if !scope.permits(store_id) {
        return Err(AppError::Forbidden(
            "You can only view statistics for your own stores".into(),
        ));
    }

    let ratings = state.ratings.list(&RatingFilter::Store(store_id)).await?;
    let mut listings = build_listings(identity, vec![store], &ratings);

    listings
        .pop()
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
}

/// The caller's own stores, by name.
pub async fn owner_stores(
    state: &AppState,
    identity: &Identity,
) -> Result<Vec<StoreListing>, AppError> {
    scope::require_store_owner(identity)?;

    let scope = scope::aggregate_scope(state.directory.as_ref(), identity).await?;
    let owned = StoreFilter::owned_by(identity.id);
    let rating_filter = scope.rating_filter();
    let (stores, ratings) = futures::try_join!(
        state.directory.stores(&owned),
        state.ratings.list(&rating_filter),
    )?;

    let stores: Vec<Store> = stores
        .into_iter()
        .filter(|store| scope.permits(store.id))
        .collect();

    let mut listings = build_listings(identity, stores, &ratings);
    listings.sort_by(|a, b| {
        a.store
            .name
            .cmp(&b.store.name)
            .then_with(|| a.store.id.cmp(&b.store.id))
    });

    Ok(listings)
}
