use std::sync::Arc;

use crate::{
    db::{SharedDirectory, SharedRatingStore},
    engine::RecommendationPolicy,
};

#[derive(Clone)]
pub struct AppState {
    pub ratings: SharedRatingStore,
    pub directory: SharedDirectory,
    pub policy: RecommendationPolicy,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(
        ratings: SharedRatingStore,
        directory: SharedDirectory,
        policy: RecommendationPolicy,
        jwt_secret: &str,
    ) -> Self {
        Self {
            ratings,
            directory,
            policy,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}
