pub mod delete;
pub mod get;
pub mod put;

pub use delete::delete_rating;
pub use get::{count_ratings, get_rating_by_id, get_rating_by_pair, get_ratings};
pub use put::upsert_rating;
