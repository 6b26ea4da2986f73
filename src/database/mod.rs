pub mod categories;
pub mod manager;
pub mod models;
pub mod petitions;
pub mod support_tiers;
pub mod supporters;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
