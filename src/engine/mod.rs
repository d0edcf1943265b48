//! The rating aggregation and recommendation engine.
//!
//! `ratings` is the only write path. Everything else reads current storage on
//! each call and computes its statistics from scratch; no aggregate is cached
//! or persisted.

pub mod aggregation;
pub mod dashboard;
pub mod listing;
pub mod ratings;
pub mod recommendation;
pub mod scope;
pub mod users;

pub use dashboard::{admin_dashboard, dashboard_for, store_owner_dashboard, user_dashboard};
pub use listing::{get_store, list_stores, owner_stores};
pub use ratings::{
    all_ratings, delete_rating, my_rating, store_rating_stats, store_ratings, submit_rating,
};
pub use recommendation::{RecommendationPolicy, needs_rating, recommended};
pub use users::{get_user, list_users};
