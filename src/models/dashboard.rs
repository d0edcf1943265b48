use serde::Serialize;

use crate::models::{
    User,
    rating::RatingEntry,
    stats::{Average, Distribution, GlobalStats, RankedStore, RaterSummary, StoreStats},
    store::{Store, StoreId},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub users: Vec<User>,
    pub stores: Vec<Store>,
    pub ratings: Vec<RatingEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboard {
    pub stats: GlobalStats,
    pub recent_activity: RecentActivity,
    pub rating_distribution: Distribution,
    pub top_stores: Vec<RankedStore>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedStoreStats {
    #[serde(flatten)]
    pub store: Store,
    #[serde(flatten)]
    pub stats: StoreStats,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerOverview {
    pub total_stores: u64,
    pub overall_average: Average,
    pub total_ratings: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRaters {
    pub store_id: StoreId,
    pub store_name: String,
    pub unique_raters: u64,
    pub rater_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOwnerDashboard {
    pub stores: Vec<OwnedStoreStats>,
    pub overall: OwnerOverview,
    pub recent_ratings: Vec<RatingEntry>,
    pub rating_distribution: Distribution,
    pub store_raters: Vec<StoreRaters>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDashboard {
    pub summary: RaterSummary,
    pub recent_ratings: Vec<RatingEntry>,
    pub rating_distribution: Distribution,
    pub recommended: Vec<RankedStore>,
    pub needs_rating: Vec<RankedStore>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", content = "dashboard", rename_all = "snake_case")]
pub enum Dashboard {
    Admin(AdminDashboard),
    StoreOwner(StoreOwnerDashboard),
    User(UserDashboard),
}
