use sqlx::PgPool;
use tracing::info;

use super::models::SupportTier;

/// Payload for inserting a tier, either at petition creation or afterwards.
#[derive(Debug, Clone)]
pub struct NewSupportTier {
    pub title: String,
    pub description: String,
    pub cost: i32,
}

pub async fn list_for_petition(
    pool: &PgPool,
    petition_id: i64,
) -> Result<Vec<SupportTier>, sqlx::Error> {
    sqlx::query_as::<_, SupportTier>(
        "SELECT id, petition_id, title, description, cost \
         FROM support_tiers WHERE petition_id = $1 ORDER BY id",
    )
    .bind(petition_id)
    .fetch_all(pool)
    .await
}

pub async fn get(pool: &PgPool, id: i64) -> Result<Option<SupportTier>, sqlx::Error> {
    sqlx::query_as::<_, SupportTier>(
        "SELECT id, petition_id, title, description, cost FROM support_tiers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn insert(
    pool: &PgPool,
    petition_id: i64,
    tier: &NewSupportTier,
) -> Result<i64, sqlx::Error> {
    info!("Inserting support tier for petition {}", petition_id);
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO support_tiers (petition_id, title, description, cost) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(petition_id)
    .bind(&tier.title)
    .bind(&tier.description)
    .bind(tier.cost)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn update(
    pool: &PgPool,
    id: i64,
    title: &str,
    description: &str,
    cost: i32,
) -> Result<(), sqlx::Error> {
    info!("Updating support tier {}", id);
    sqlx::query("UPDATE support_tiers SET title = $1, description = $2, cost = $3 WHERE id = $4")
        .bind(title)
        .bind(description)
        .bind(cost)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<(), sqlx::Error> {
    info!("Deleting support tier {}", id);
    sqlx::query("DELETE FROM support_tiers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
