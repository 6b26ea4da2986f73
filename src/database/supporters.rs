use sqlx::PgPool;
use tracing::info;

use super::models::Supporter;

/// Pledges for a petition, newest first.
pub async fn list_for_petition(
    pool: &PgPool,
    petition_id: i64,
) -> Result<Vec<Supporter>, sqlx::Error> {
    sqlx::query_as::<_, Supporter>(
        "SELECT s.id, s.petition_id, s.support_tier_id, s.user_id, \
         u.first_name, u.last_name, s.message, s.timestamp \
         FROM supporters s JOIN users u ON u.id = s.user_id \
         WHERE s.petition_id = $1 \
         ORDER BY s.timestamp DESC, s.id DESC",
    )
    .bind(petition_id)
    .fetch_all(pool)
    .await
}

pub async fn count_for_petition(pool: &PgPool, petition_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM supporters WHERE petition_id = $1")
        .bind(petition_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn count_for_tier(pool: &PgPool, tier_id: i64) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM supporters WHERE support_tier_id = $1")
            .bind(tier_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Money raised for a petition: the sum of pledged tier costs.
pub async fn money_raised(pool: &PgPool, petition_id: i64) -> Result<i64, sqlx::Error> {
    let (total,): (i64,) = sqlx::query_as(
        "SELECT COALESCE(SUM(t.cost), 0)::bigint \
         FROM supporters s JOIN support_tiers t ON t.id = s.support_tier_id \
         WHERE s.petition_id = $1",
    )
    .bind(petition_id)
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn has_pledge(pool: &PgPool, tier_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM supporters WHERE support_tier_id = $1 AND user_id = $2)",
    )
    .bind(tier_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(found)
}

pub async fn insert(
    pool: &PgPool,
    petition_id: i64,
    tier_id: i64,
    user_id: i64,
    message: Option<&str>,
) -> Result<i64, sqlx::Error> {
    info!("Inserting pledge by user {} for petition {}", user_id, petition_id);
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO supporters (petition_id, support_tier_id, user_id, message, timestamp) \
         VALUES ($1, $2, $3, $4, CURRENT_TIMESTAMP) RETURNING id",
    )
    .bind(petition_id)
    .bind(tier_id)
    .bind(user_id)
    .bind(message)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
