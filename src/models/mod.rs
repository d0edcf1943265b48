pub mod dashboard;
pub mod page;
pub mod rating;
pub mod stats;
pub mod store;
pub mod user;

pub use rating::Rating;
pub use store::Store;
pub use user::{Identity, Role, User};
