//! Pure statistics over rating snapshots. Nothing here touches storage; the
//! caller hands in whatever rows it read and gets plain values back.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
};

use chrono::{DateTime, Utc};

use crate::models::{
    Rating, Role, Store, User,
    stats::{
        Average, Distribution, GlobalStats, RankedStore, RaterSummary, StoreStats, UsersByRole,
    },
    store::StoreId,
    user::UserId,
};

pub fn store_stats<'a, I>(ratings: I) -> StoreStats
where
    I: IntoIterator<Item = &'a Rating>,
{
    ratings
        .into_iter()
        .fold(StoreStats::default(), |mut stats, rating| {
            stats.record(rating.score);
            stats
        })
}

/// Groups a snapshot by store in one pass. Stores without ratings are absent;
/// use [`stats_for`] to read with a zero default.
pub fn stats_by_store(ratings: &[Rating]) -> HashMap<StoreId, StoreStats> {
    let mut by_store: HashMap<StoreId, StoreStats> = HashMap::new();
    for rating in ratings {
        by_store.entry(rating.store_id).or_default().record(rating.score);
    }
    by_store
}

pub fn stats_for(by_store: &HashMap<StoreId, StoreStats>, store_id: StoreId) -> StoreStats {
    by_store.get(&store_id).copied().unwrap_or_default()
}

pub fn global_stats(users: &[User], stores: &[Store], total_ratings: u64) -> GlobalStats {
    let users_by_role = users
        .iter()
        .fold(UsersByRole::default(), |mut counts, user| {
            match user.role {
                Role::Admin => counts.admin += 1,
                Role::StoreOwner => counts.store_owner += 1,
                Role::User => counts.user += 1,
            }
            counts
        });

    GlobalStats {
        total_users: users.len() as u64,
        total_stores: stores.len() as u64,
        total_ratings,
        users_by_role,
    }
}

pub fn rating_distribution<'a, I>(ratings: I) -> Distribution
where
    I: IntoIterator<Item = &'a Rating>,
{
    ratings
        .into_iter()
        .fold(Distribution::default(), |mut distribution, rating| {
            distribution.record(rating.score);
            distribution
        })
}

pub fn rater_summary<'a, I>(ratings: I) -> RaterSummary
where
    I: IntoIterator<Item = &'a Rating>,
{
    let stats = store_stats(ratings);
    RaterSummary {
        count: stats.count,
        average: stats.average,
    }
}

pub fn unique_raters<'a, I>(ratings: I) -> u64
where
    I: IntoIterator<Item = &'a Rating>,
{
    ratings
        .into_iter()
        .map(|rating| rating.rater_id)
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Average descending, then count descending, then store id ascending.
pub fn quality_order(a: &RankedStore, b: &RankedStore) -> Ordering {
    b.average
        .cmp(&a.average)
        .then_with(|| b.count.cmp(&a.count))
        .then_with(|| a.store.id.cmp(&b.store.id))
}

pub fn rank(store: &Store, stats: &StoreStats) -> RankedStore {
    RankedStore {
        store: store.clone(),
        average: stats.average,
        count: stats.count,
    }
}

/// Best rated stores that have at least one rating.
pub fn top_stores(stores: &[Store], ratings: &[Rating], n: usize) -> Vec<RankedStore> {
    let by_store = stats_by_store(ratings);

    let mut ranked: Vec<RankedStore> = stores
        .iter()
        .filter_map(|store| {
            by_store
                .get(&store.id)
                .filter(|stats| stats.count > 0)
                .map(|stats| rank(store, stats))
        })
        .collect();

    ranked.sort_by(quality_order);
    ranked.truncate(n);
    ranked
}

/// Mean score over every rating of every store the owner holds. An owner
/// whose stores have no ratings gets an empty average.
pub fn owner_average(owner_id: UserId, stores: &[Store], ratings: &[Rating]) -> Average {
    let owned: HashSet<StoreId> = stores
        .iter()
        .filter(|store| store.is_owned_by(owner_id))
        .map(|store| store.id)
        .collect();

    Average::of_scores(
        ratings
            .iter()
            .filter(|rating| owned.contains(&rating.store_id))
            .map(|rating| rating.score),
    )
}

/// [`owner_average`] for every owner in one pass over the ratings.
pub fn owner_averages(stores: &[Store], ratings: &[Rating]) -> HashMap<UserId, Average> {
    let owners: HashMap<StoreId, UserId> = stores
        .iter()
        .filter_map(|store| store.owner_id.map(|owner| (store.id, owner)))
        .collect();

    let mut averages: HashMap<UserId, Average> = owners
        .values()
        .map(|owner| (*owner, Average::default()))
        .collect();
    for rating in ratings {
        if let Some(owner) = owners.get(&rating.store_id) {
            averages.entry(*owner).or_default().add(rating.score);
        }
    }
    averages
}

/// Anything with a creation time and a storage-assigned, monotonic id.
pub trait Chronological {
    fn created_at(&self) -> DateTime<Utc>;
    fn entity_id(&self) -> i64;
}

impl Chronological for User {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl Chronological for Store {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn entity_id(&self) -> i64 {
        self.id
    }
}

impl Chronological for Rating {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn entity_id(&self) -> i64 {
        self.id
    }
}

pub fn newest_first<T: Chronological>(a: &T, b: &T) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.entity_id().cmp(&a.entity_id()))
}

/// The `n` most recently created entities, newest first. Equal timestamps
/// fall back to the higher id.
pub fn recent_entities<T: Chronological + Clone>(items: &[T], n: usize) -> Vec<T> {
    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| newest_first(*a, *b));
    sorted.into_iter().take(n).cloned().collect()
}

/// Ratings ordered by last update, newest first.
pub fn recently_updated(ratings: &[Rating], n: usize) -> Vec<Rating> {
    let mut sorted: Vec<&Rating> = ratings.iter().collect();
    sorted.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    sorted.into_iter().take(n).cloned().collect()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn rating(id: i64, rater_id: i64, store_id: i64, score: i16) -> Rating {
        Rating {
            id,
            rater_id,
            store_id,
            score,
            created_at: at(id),
            updated_at: at(id),
        }
    }

    fn store(id: i64) -> Store {
        Store {
            id,
            name: format!("Store {id}"),
            email: format!("store{id}@example.com"),
            address: None,
            owner_id: None,
            created_at: at(0),
        }
    }

    fn ratings_for(store_id: i64, scores: &[i16], first_id: i64) -> Vec<Rating> {
        scores
            .iter()
            .enumerate()
            .map(|(i, score)| {
                let offset = i as i64;
                rating(first_id + offset, 100 + offset, store_id, *score)
            })
            .collect()
    }

    #[test]
    fn store_stats_for_mixed_scores() {
        let ratings = ratings_for(1, &[5, 5, 4, 3, 1], 1);
        let stats = store_stats(&ratings);

        assert_eq!(stats.count, 5);
        assert_eq!(stats.average.to_string(), "3.60");
        assert_eq!(stats.distribution.count(5), 2);
        assert_eq!(stats.distribution.count(4), 1);
        assert_eq!(stats.distribution.count(3), 1);
        assert_eq!(stats.distribution.count(2), 0);
        assert_eq!(stats.distribution.count(1), 1);
    }

    #[test]
    fn store_stats_without_ratings_is_zero() {
        let stats = store_stats(&[]);

        assert_eq!(stats.count, 0);
        assert_eq!(stats.average.to_string(), "0.00");
        assert_eq!(stats.distribution.total(), 0);
        assert_eq!(stats.distribution.entries().len(), 5);
    }

    #[test]
    fn top_stores_skips_unrated_and_breaks_ties_by_count() {
        let stores = vec![store(1), store(2), store(3)];
        // Both rated stores average 4.50.
        let mut ratings = ratings_for(1, &[5, 4, 5, 4, 5, 4, 5, 4, 5, 4], 1);
        ratings.extend(ratings_for(2, &[5, 4, 5, 4], 20));

        let top = top_stores(&stores, &ratings, 5);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].store.id, 1);
        assert_eq!(top[0].count, 10);
        assert_eq!(top[1].store.id, 2);
        assert!(top.iter().all(|ranked| ranked.count > 0));
    }

    #[test]
    fn top_stores_falls_back_to_id_and_truncates() {
        let stores = vec![store(3), store(2), store(1)];
        let mut ratings = ratings_for(3, &[4], 1);
        ratings.extend(ratings_for(2, &[4], 10));
        ratings.extend(ratings_for(1, &[2], 20));

        let top = top_stores(&stores, &ratings, 2);

        let ids: Vec<_> = top.iter().map(|ranked| ranked.store.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    fn owned(id: i64, owner_id: i64) -> Store {
        Store {
            owner_id: Some(owner_id),
            ..store(id)
        }
    }

    #[test]
    fn owner_average_spans_all_owned_stores() {
        let stores = vec![owned(1, 7), owned(2, 7), owned(3, 8), store(4)];
        let mut ratings = ratings_for(1, &[5, 3], 1);
        ratings.extend(ratings_for(2, &[4], 10));
        ratings.extend(ratings_for(3, &[1, 1], 20));
        ratings.extend(ratings_for(4, &[2], 30));

        assert_eq!(owner_average(7, &stores, &ratings).to_string(), "4.00");
        assert_eq!(owner_average(7, &stores, &ratings).count(), 3);
        assert_eq!(owner_average(8, &stores, &ratings).to_string(), "1.00");
        assert_eq!(owner_average(9, &stores, &ratings).count(), 0);

        let averages = owner_averages(&stores, &ratings);
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[&7], owner_average(7, &stores, &ratings));
        assert_eq!(averages[&8].count(), 2);
    }

    #[test]
    fn owner_without_ratings_averages_zero() {
        let stores = vec![owned(1, 7)];
        let averages = owner_averages(&stores, &[]);

        assert_eq!(averages[&7].count(), 0);
        assert_eq!(averages[&7].to_string(), "0.00");
    }

    #[test]
    fn global_stats_counts_roles() {
        let user = |id, role| User {
            id,
            name: format!("user {id}"),
            email: format!("u{id}@example.com"),
            role,
            created_at: at(id),
        };
        let users = vec![
            user(1, Role::Admin),
            user(2, Role::StoreOwner),
            user(3, Role::User),
            user(4, Role::User),
        ];

        let stats = global_stats(&users, &[store(1)], 9);

        assert_eq!(stats.total_users, 4);
        assert_eq!(stats.total_stores, 1);
        assert_eq!(stats.total_ratings, 9);
        assert_eq!(stats.users_by_role.user, 2);
        assert_eq!(stats.users_by_role.admin, 1);
        assert_eq!(stats.users_by_role.store_owner, 1);
    }

    #[test]
    fn recent_entities_breaks_timestamp_ties_by_id() {
        let mut stores: Vec<Store> = (1..=4).map(store).collect();
        stores[0].created_at = at(10);

        let recent = recent_entities(&stores, 3);

        let ids: Vec<_> = recent.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 4, 3]);
    }

    #[test]
    fn recently_updated_orders_by_update_time() {
        let mut ratings = ratings_for(1, &[3, 4, 5], 1);
        ratings[0].updated_at = at(60);

        let recent = recently_updated(&ratings, 10);

        let ids: Vec<_> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn unique_raters_counts_distinct_ids() {
        let mut ratings = ratings_for(1, &[3, 4], 1);
        ratings.push(rating(9, ratings[0].rater_id, 2, 5));

        assert_eq!(unique_raters(&ratings), 2);
    }
}
