#![allow(dead_code)]

use std::sync::Arc;

use store_ratings::{
    db::{MemoryDirectory, MemoryRatingStore},
    engine::{self, RecommendationPolicy},
    models::{Identity, Role, Store},
    state::AppState,
};

pub const JWT_SECRET: &str = "test-secret";

pub struct Fixture {
    pub state: AppState,
    pub directory: Arc<MemoryDirectory>,
}

impl Fixture {
    pub fn new() -> Self {
        let directory = Arc::new(MemoryDirectory::new());
        let state = AppState::new(
            Arc::new(MemoryRatingStore::new()),
            directory.clone(),
            RecommendationPolicy::default(),
            JWT_SECRET,
        );
        Self { state, directory }
    }

    pub async fn admin(&self) -> Identity {
        self.directory
            .create_user("Admin Person", "admin@example.com", Role::Admin)
            .await
            .identity()
    }

    pub async fn owner(&self, name: &str) -> Identity {
        let email = format!("{}@owners.example.com", name.to_lowercase().replace(' ', "."));
        self.directory
            .create_user(name, &email, Role::StoreOwner)
            .await
            .identity()
    }

    pub async fn users(&self, count: usize) -> Vec<Identity> {
        let mut users = Vec::with_capacity(count);
        for n in 0..count {
            let user = self
                .directory
                .create_user(
                    &format!("Rater Number {n:02}"),
                    &format!("rater{n}@example.com"),
                    Role::User,
                )
                .await;
            users.push(user.identity());
        }
        users
    }

    pub async fn store(&self, name: &str, owner: Option<&Identity>) -> Store {
        let email = format!("{}@stores.example.com", name.to_lowercase().replace(' ', "-"));
        self.directory
            .create_store(name, &email, Some("1 Main Street"), owner.map(|o| o.id))
            .await
            .unwrap()
    }

    /// Each score is submitted by a distinct freshly created user.
    pub async fn rate_with_new_users(&self, store: &Store, scores: &[i16]) -> Vec<Identity> {
        let raters = self.users(scores.len()).await;
        for (rater, score) in raters.iter().zip(scores) {
            engine::submit_rating(&self.state, rater, store.id, i64::from(*score))
                .await
                .unwrap();
        }
        raters
    }
}
