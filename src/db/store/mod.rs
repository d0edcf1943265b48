pub mod get;

pub use get::{get_store_by_id, get_stores};
