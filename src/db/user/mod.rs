pub mod get;

pub use get::{get_all_users, get_user_by_id};
