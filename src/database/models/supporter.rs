use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A pledge, with the supporter's name joined in for response assembly.
/// Pledges are immutable once written; there is no update or delete.
#[derive(Debug, Clone, FromRow)]
pub struct Supporter {
    pub id: i64,
    pub petition_id: i64,
    pub support_tier_id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}
