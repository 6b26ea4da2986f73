use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// One row of the petition listing, with the owner's name joined in and the
/// minimum supporting cost aggregated over the petition's tiers.
#[derive(Debug, Clone, FromRow)]
pub struct PetitionSummary {
    pub id: i64,
    pub title: String,
    pub category_id: i64,
    pub owner_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub creation_date: DateTime<Utc>,
    pub supporting_cost: Option<i32>,
    pub number_of_supporters: i64,
}

/// A single petition with its owner's name joined in. Supporter counts,
/// money raised and tiers are fetched separately.
#[derive(Debug, Clone, FromRow)]
pub struct PetitionDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub owner_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub creation_date: DateTime<Utc>,
    pub image_filename: Option<String>,
}
