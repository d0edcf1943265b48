use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    db::{Directory, RatingStore},
    errors::AppError,
    models::{
        Rating, Role, Store, User,
        rating::{RatingFilter, RatingId, SubmittedRating, UpsertOutcome},
        store::{StoreFilter, StoreId},
        user::UserId,
    },
};

#[derive(Default)]
struct RatingTable {
    last_id: RatingId,
    rows: BTreeMap<RatingId, Rating>,
    by_pair: HashMap<(UserId, StoreId), RatingId>,
}

/// Rating rows held in process. Every upsert runs under one write lock, which
/// plays the role of the `(user_id, store_id)` unique constraint.
#[derive(Default)]
pub struct MemoryRatingStore {
    table: RwLock<RatingTable>,
}

impl MemoryRatingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RatingStore for MemoryRatingStore {
    async fn upsert(
        &self,
        rater_id: UserId,
        store_id: StoreId,
        score: i16,
        at: DateTime<Utc>,
    ) -> Result<SubmittedRating, AppError> {
        let mut table = self.table.write().await;

        if let Some(id) = table.by_pair.get(&(rater_id, store_id)).copied() {
            let row = table.rows.get_mut(&id).ok_or_else(|| {
                AppError::Conflict(format!("Rating index points at missing row {id}"))
            })?;
            row.score = score;
            row.updated_at = at;

            return Ok(SubmittedRating {
                rating: row.clone(),
                outcome: UpsertOutcome::Updated,
            });
        }

        table.last_id += 1;
        let rating = Rating {
            id: table.last_id,
            rater_id,
            store_id,
            score,
            created_at: at,
            updated_at: at,
        };
        table.by_pair.insert((rater_id, store_id), rating.id);
        table.rows.insert(rating.id, rating.clone());

        Ok(SubmittedRating {
            rating,
            outcome: UpsertOutcome::Created,
        })
    }

    async fn find(&self, id: RatingId) -> Result<Option<Rating>, AppError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn find_by_pair(
        &self,
        rater_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .by_pair
            .get(&(rater_id, store_id))
            .and_then(|id| table.rows.get(id))
            .cloned())
    }

    async fn list(&self, filter: &RatingFilter) -> Result<Vec<Rating>, AppError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|rating| filter.matches(rating))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.table.read().await.rows.len() as u64)
    }

    async fn delete(&self, id: RatingId) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        match table.rows.remove(&id) {
            Some(rating) => {
                table.by_pair.remove(&(rating.rater_id, rating.store_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
struct DirectoryTables {
    last_user_id: UserId,
    last_store_id: StoreId,
    users: BTreeMap<UserId, User>,
    stores: BTreeMap<StoreId, Store>,
}

/// User and store records held in process, for local runs and tests.
#[derive(Default)]
pub struct MemoryDirectory {
    tables: RwLock<DirectoryTables>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_user(&self, name: &str, email: &str, role: Role) -> User {
        self.create_user_at(name, email, role, Utc::now()).await
    }

    pub async fn create_user_at(
        &self,
        name: &str,
        email: &str,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> User {
        let mut tables = self.tables.write().await;
        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            name: name.into(),
            email: email.into(),
            role,
            created_at,
        };
        tables.users.insert(user.id, user.clone());
        user
    }

    pub async fn create_store(
        &self,
        name: &str,
        email: &str,
        address: Option<&str>,
        owner_id: Option<UserId>,
    ) -> Result<Store, AppError> {
        self.create_store_at(name, email, address, owner_id, Utc::now())
            .await
    }

    /// Mirrors the owner rule the master-record service applies: an owner must
    /// exist and hold the `store_owner` role.
    pub async fn create_store_at(
        &self,
        name: &str,
        email: &str,
        address: Option<&str>,
        owner_id: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Result<Store, AppError> {
        let mut tables = self.tables.write().await;

        if let Some(owner_id) = owner_id {
            match tables.users.get(&owner_id) {
                Some(owner) if owner.role == Role::StoreOwner => {}
                Some(_) => {
                    return Err(AppError::InvalidArgument(
                        "User must have store_owner role to own a store".into(),
                    ));
                }
                None => {
                    return Err(AppError::NotFound(format!("Owner {owner_id} not found")));
                }
            }
        }

        tables.last_store_id += 1;
        let store = Store {
            id: tables.last_store_id,
            name: name.into(),
            email: email.into(),
            address: address.map(Into::into),
            owner_id,
            created_at,
        };
        tables.stores.insert(store.id, store.clone());
        Ok(store)
    }

    pub async fn remove_store(&self, id: StoreId) -> bool {
        self.tables.write().await.stores.remove(&id).is_some()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn store_matches(store: &Store, filter: &StoreFilter) -> bool {
    let name_ok = filter
        .name
        .as_deref()
        .is_none_or(|needle| contains_ignore_case(&store.name, needle));
    let address_ok = filter.address.as_deref().is_none_or(|needle| {
        store
            .address
            .as_deref()
            .is_some_and(|address| contains_ignore_case(address, needle))
    });
    let owner_ok = filter.owner_id.is_none_or(|owner| store.is_owned_by(owner));

    name_ok && address_ok && owner_ok
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn store(&self, id: StoreId) -> Result<Option<Store>, AppError> {
        Ok(self.tables.read().await.stores.get(&id).cloned())
    }

    async fn stores(&self, filter: &StoreFilter) -> Result<Vec<Store>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .stores
            .values()
            .filter(|store| store_matches(store, filter))
            .cloned()
            .collect())
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, AppError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_keeps_one_row_per_pair() {
        let store = MemoryRatingStore::new();
        let first = Utc::now();
        let later = first + chrono::Duration::seconds(30);

        let created = store.upsert(1, 7, 2, first).await.unwrap();
        let updated = store.upsert(1, 7, 4, later).await.unwrap();

        assert_eq!(created.outcome, UpsertOutcome::Created);
        assert_eq!(updated.outcome, UpsertOutcome::Updated);
        assert_eq!(updated.rating.id, created.rating.id);
        assert_eq!(updated.rating.created_at, first);
        assert_eq!(updated.rating.updated_at, later);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_frees_the_pair() {
        let store = MemoryRatingStore::new();
        let rating = store.upsert(1, 7, 2, Utc::now()).await.unwrap().rating;

        assert!(store.delete(rating.id).await.unwrap());
        assert!(!store.delete(rating.id).await.unwrap());
        assert!(store.find_by_pair(1, 7).await.unwrap().is_none());

        let again = store.upsert(1, 7, 5, Utc::now()).await.unwrap();
        assert_eq!(again.outcome, UpsertOutcome::Created);
        assert_ne!(again.rating.id, rating.id);
    }

    #[tokio::test]
    async fn store_filter_is_case_insensitive_substring() {
        let directory = MemoryDirectory::new();
        let owner = directory
            .create_user("Olive Owner", "olive@example.com", Role::StoreOwner)
            .await;
        directory
            .create_store("Corner Bakery", "bake@example.com", Some("12 Elm Street"), Some(owner.id))
            .await
            .unwrap();
        directory
            .create_store("Hardware Hub", "hub@example.com", None, None)
            .await
            .unwrap();

        let by_name = StoreFilter {
            name: Some("bAkErY".into()),
            ..Default::default()
        };
        let by_address = StoreFilter {
            address: Some("elm".into()),
            ..Default::default()
        };

        assert_eq!(directory.stores(&by_name).await.unwrap().len(), 1);
        assert_eq!(directory.stores(&by_address).await.unwrap().len(), 1);
        assert_eq!(
            directory
                .stores(&StoreFilter::owned_by(owner.id))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn store_owner_must_hold_owner_role() {
        let directory = MemoryDirectory::new();
        let user = directory
            .create_user("Plain User", "user@example.com", Role::User)
            .await;

        let err = directory
            .create_store("Shop", "shop@example.com", None, Some(user.id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }
}
