//! One read-only composition per role.
//!
//! Sub-reads are issued concurrently and are not isolated from each other: a
//! rating committed between two of them may show up in one section and not in
//! another. Each section is still computed from committed data only.

use crate::{
    engine::{
        aggregation::{
            global_stats, rating_distribution, rater_summary, recent_entities, recently_updated,
            stats_by_store, stats_for, top_stores, unique_raters,
        },
        ratings::{index_stores, index_users, to_entries},
        recommendation::{select_needs_rating, select_recommended},
        scope::{self, RaterVisibility},
    },
    errors::AppError,
    models::{
        Identity, Role,
        dashboard::{
            AdminDashboard, Dashboard, OwnedStoreStats, OwnerOverview, RecentActivity,
            StoreOwnerDashboard, StoreRaters, UserDashboard,
        },
        rating::RatingFilter,
        stats::Average,
        store::StoreFilter,
    },
    state::AppState,
};

pub const ADMIN_RECENT_LIMIT: usize = 5;
pub const TOP_STORES_LIMIT: usize = 5;
pub const OWNER_RECENT_LIMIT: usize = 10;
pub const USER_RECENT_LIMIT: usize = 10;
pub const CANDIDATE_LIMIT: usize = 5;

pub async fn admin_dashboard(
    state: &AppState,
    identity: &Identity,
) -> Result<AdminDashboard, AppError> {
    scope::require_admin(identity)?;

    let all_stores = StoreFilter::default();
    let all_ratings = RatingFilter::All;
    let (users, stores, ratings) = futures::try_join!(
        state.directory.users(),
        state.directory.stores(&all_stores),
        state.ratings.list(&all_ratings),
    )?;

    let stats = global_stats(&users, &stores, ratings.len() as u64);
    let rating_distribution = rating_distribution(&ratings);
    let top_stores = top_stores(&stores, &ratings, TOP_STORES_LIMIT);

    let recent_users = recent_entities(&users, ADMIN_RECENT_LIMIT);
    let recent_stores = recent_entities(&stores, ADMIN_RECENT_LIMIT);
    let recent_ratings = recent_entities(&ratings, ADMIN_RECENT_LIMIT);
    let recent_ratings = to_entries(
        recent_ratings,
        &index_users(users),
        &index_stores(stores),
        RaterVisibility::Full,
    );

    Ok(AdminDashboard {
        stats,
        recent_activity: RecentActivity {
            users: recent_users,
            stores: recent_stores,
            ratings: recent_ratings,
        },
        rating_distribution,
        top_stores,
    })
}

pub async fn store_owner_dashboard(
    state: &AppState,
    identity: &Identity,
) -> Result<StoreOwnerDashboard, AppError> {
    scope::require_store_owner(identity)?;

    let scope = scope::aggregate_scope(state.directory.as_ref(), identity).await?;
    let store_filter = scope.store_filter(identity);
    let rating_filter = scope.rating_filter();
    let (stores, ratings, users) = futures::try_join!(
        state.directory.stores(&store_filter),
        state.ratings.list(&rating_filter),
        state.directory.users(),
    )?;

    // The store list is re-read above, so keep only what the scope admitted.
    let mut stores: Vec<_> = stores
        .into_iter()
        .filter(|store| scope.permits(store.id))
        .collect();
    let ratings: Vec<_> = ratings
        .into_iter()
        .filter(|rating| scope.permits(rating.store_id))
        .collect();
    stores.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));

    let by_store = stats_by_store(&ratings);
    let users = index_users(users);

    let mut overall_average = Average::default();
    let owned: Vec<OwnedStoreStats> = stores
        .iter()
        .map(|store| {
            let stats = stats_for(&by_store, store.id);
            overall_average.merge(&stats.average);
            OwnedStoreStats {
                store: store.clone(),
                stats,
            }
        })
        .collect();

    let mut store_raters: Vec<StoreRaters> = stores
        .iter()
        .map(|store| {
            let store_ratings = ratings.iter().filter(|rating| rating.store_id == store.id);
            let mut rater_names: Vec<String> = store_ratings
                .clone()
                .filter_map(|rating| users.get(&rating.rater_id))
                .map(|user| user.name.clone())
                .collect();
            rater_names.sort();
            rater_names.dedup();

            StoreRaters {
                store_id: store.id,
                store_name: store.name.clone(),
                unique_raters: unique_raters(store_ratings),
                rater_names,
            }
        })
        .collect();
    store_raters.sort_by(|a, b| {
        b.unique_raters
            .cmp(&a.unique_raters)
            .then_with(|| a.store_id.cmp(&b.store_id))
    });

    let overall = OwnerOverview {
        total_stores: stores.len() as u64,
        overall_average,
        total_ratings: overall_average.count(),
    };
    let rating_distribution = rating_distribution(&ratings);
    let recent_ratings = to_entries(
        recent_entities(&ratings, OWNER_RECENT_LIMIT),
        &users,
        &index_stores(stores),
        RaterVisibility::Full,
    );

    Ok(StoreOwnerDashboard {
        stores: owned,
        overall,
        recent_ratings,
        rating_distribution,
        store_raters,
    })
}

pub async fn user_dashboard(
    state: &AppState,
    identity: &Identity,
) -> Result<UserDashboard, AppError> {
    scope::require_user(identity)?;

    // One rating read feeds both the personal stats and the candidate lists,
    // so a store rated in that read can never be offered as a candidate.
    let all_ratings = RatingFilter::All;
    let all_stores = StoreFilter::default();
    let (ratings, stores) = futures::try_join!(
        state.ratings.list(&all_ratings),
        state.directory.stores(&all_stores),
    )?;

    let own_filter = scope::own_ratings(identity);
    let own: Vec<_> = ratings
        .iter()
        .filter(|rating| own_filter.matches(rating))
        .cloned()
        .collect();

    let summary = rater_summary(&own);
    let rating_distribution = rating_distribution(&own);
    let recommended = select_recommended(
        identity.id,
        &stores,
        &ratings,
        &state.policy,
        CANDIDATE_LIMIT,
    );
    let needs_rating = select_needs_rating(
        identity.id,
        &stores,
        &ratings,
        &state.policy,
        CANDIDATE_LIMIT,
    );
    let recent_ratings = to_entries(
        recently_updated(&own, USER_RECENT_LIMIT),
        &Default::default(),
        &index_stores(stores),
        RaterVisibility::Hidden,
    );

    Ok(UserDashboard {
        summary,
        recent_ratings,
        rating_distribution,
        recommended,
        needs_rating,
    })
}

pub async fn dashboard_for(state: &AppState, identity: &Identity) -> Result<Dashboard, AppError> {
    let dashboard = match identity.role {
        Role::Admin => Dashboard::Admin(admin_dashboard(state, identity).await?),
        Role::StoreOwner => Dashboard::StoreOwner(store_owner_dashboard(state, identity).await?),
        Role::User => Dashboard::User(user_dashboard(state, identity).await?),
    };
    Ok(dashboard)
}
