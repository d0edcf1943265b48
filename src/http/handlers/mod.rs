pub mod dashboard;
pub mod health;
pub mod ratings;
pub mod stores;
pub mod users;

pub use dashboard::{
    admin_dashboard_handler, dashboard_handler, store_owner_dashboard_handler,
    user_dashboard_handler,
};

pub use health::health_handler;

pub use ratings::{
    delete_rating_handler, get_all_ratings_handler, get_my_rating_handler,
    get_store_rating_stats_handler, get_store_ratings_handler, submit_rating_handler,
};

pub use stores::{get_my_stores_handler, get_store_handler, get_stores_handler};

pub use users::{get_user_handler, get_users_handler};
