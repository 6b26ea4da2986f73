use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct SupportTier {
    pub id: i64,
    pub petition_id: i64,
    pub title: String,
    pub description: String,
    pub cost: i32,
}
