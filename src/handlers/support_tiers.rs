use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::auth;
use crate::database::models::{PetitionDetail, SupportTier};
use crate::database::support_tiers::NewSupportTier;
use crate::database::{petitions, support_tiers, supporters, DatabaseManager};
use crate::error::ApiError;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct AddTierRequest {
    pub title: String,
    pub description: String,
    pub cost: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTierRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cost: Option<i32>,
}

/// Resolve the petition and confirm the caller owns it.
async fn owned_petition(
    pool: &sqlx::PgPool,
    headers: &HeaderMap,
    petition_id: i64,
) -> Result<PetitionDetail, ApiError> {
    let caller = auth::require_user(pool, headers).await?;

    let petition = petitions::get_one(pool, petition_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    if petition.owner_id != caller.id {
        return Err(ApiError::forbidden("Forbidden: User is not the owner of the petition"));
    }
    Ok(petition)
}

/// Resolve a tier and confirm it belongs to the petition in the path.
async fn tier_of_petition(
    pool: &sqlx::PgPool,
    petition_id: i64,
    tier_id: i64,
) -> Result<SupportTier, ApiError> {
    support_tiers::get(pool, tier_id)
        .await?
        .filter(|t| t.petition_id == petition_id)
        .ok_or_else(|| ApiError::not_found("Not Found: Support tier not found"))
}

/// A tier freezes once anyone has pledged at it.
fn ensure_tier_open(pledge_count: i64) -> Result<(), ApiError> {
    if pledge_count > 0 {
        return Err(ApiError::forbidden(
            "Forbidden: Supporters have already supported this tier",
        ));
    }
    Ok(())
}

fn ensure_room_for_tier(siblings: &[SupportTier]) -> Result<(), ApiError> {
    if siblings.len() >= 3 {
        return Err(ApiError::forbidden("Forbidden: Petition already has 3 support tiers"));
    }
    Ok(())
}

/// Title uniqueness among a petition's tiers; `exclude_id` lets an update
/// re-send its current title.
fn ensure_unique_tier_title(
    siblings: &[SupportTier],
    title: &str,
    exclude_id: Option<i64>,
) -> Result<(), ApiError> {
    if siblings.iter().any(|t| Some(t.id) != exclude_id && t.title == title) {
        return Err(ApiError::forbidden(
            "Forbidden: Petition already has a support tier with this title",
        ));
    }
    Ok(())
}

fn ensure_not_last_tier(siblings: &[SupportTier]) -> Result<(), ApiError> {
    if siblings.len() <= 1 {
        return Err(ApiError::forbidden(
            "Forbidden: Can not remove a support tier if it is the only one for a petition",
        ));
    }
    Ok(())
}

/// POST /petitions/:id/supportTiers
pub async fn add(
    Path(petition_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<AddTierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_title(&body.title).map_err(ApiError::bad_request)?;
    validation::validate_description(&body.description).map_err(ApiError::bad_request)?;
    validation::validate_cost(body.cost).map_err(ApiError::bad_request)?;

    let pool = DatabaseManager::pool().await?;
    owned_petition(&pool, &headers, petition_id).await?;

    let existing = support_tiers::list_for_petition(&pool, petition_id).await?;
    ensure_room_for_tier(&existing)?;
    ensure_unique_tier_title(&existing, &body.title, None)?;

    let tier = NewSupportTier {
        title: body.title,
        description: body.description,
        cost: body.cost,
    };
    support_tiers::insert(&pool, petition_id, &tier).await?;

    Ok(StatusCode::CREATED)
}

/// PATCH /petitions/:id/supportTiers/:tierId - frozen once supported
pub async fn edit(
    Path((petition_id, tier_id)): Path<(i64, i64)>,
    headers: HeaderMap,
    Json(body): Json<UpdateTierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(title) = &body.title {
        validation::validate_title(title).map_err(ApiError::bad_request)?;
    }
    if let Some(description) = &body.description {
        validation::validate_description(description).map_err(ApiError::bad_request)?;
    }
    if let Some(cost) = body.cost {
        validation::validate_cost(cost).map_err(ApiError::bad_request)?;
    }

    let pool = DatabaseManager::pool().await?;
    owned_petition(&pool, &headers, petition_id).await?;
    let tier = tier_of_petition(&pool, petition_id, tier_id).await?;

    ensure_tier_open(supporters::count_for_tier(&pool, tier_id).await?)?;

    if let Some(title) = &body.title {
        let siblings = support_tiers::list_for_petition(&pool, petition_id).await?;
        ensure_unique_tier_title(&siblings, title, Some(tier_id))?;
    }

    let title = body.title.as_deref().unwrap_or(&tier.title);
    let description = body.description.as_deref().unwrap_or(&tier.description);
    let cost = body.cost.unwrap_or(tier.cost);

    support_tiers::update(&pool, tier_id, title, description, cost).await?;

    Ok(StatusCode::OK)
}

/// DELETE /petitions/:id/supportTiers/:tierId - never the last tier
pub async fn delete(
    Path((petition_id, tier_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    owned_petition(&pool, &headers, petition_id).await?;
    tier_of_petition(&pool, petition_id, tier_id).await?;

    ensure_tier_open(supporters::count_for_tier(&pool, tier_id).await?)?;

    let siblings = support_tiers::list_for_petition(&pool, petition_id).await?;
    ensure_not_last_tier(&siblings)?;

    support_tiers::delete(&pool, tier_id).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(id: i64, title: &str) -> SupportTier {
        SupportTier {
            id,
            petition_id: 1,
            title: title.to_string(),
            description: "d".to_string(),
            cost: 5,
        }
    }

    #[test]
    fn supported_tier_rejects_changes() {
        assert!(ensure_tier_open(0).is_ok());
        let err = ensure_tier_open(1).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Forbidden: Supporters have already supported this tier");
    }

    #[test]
    fn tier_cap_is_three() {
        let two = vec![tier(1, "Bronze"), tier(2, "Silver")];
        assert!(ensure_room_for_tier(&two).is_ok());

        let three = vec![tier(1, "Bronze"), tier(2, "Silver"), tier(3, "Gold")];
        assert_eq!(ensure_room_for_tier(&three).unwrap_err().status_code(), 403);
    }

    #[test]
    fn tier_titles_stay_unique_within_a_petition() {
        let tiers = vec![tier(1, "Bronze"), tier(2, "Silver")];
        assert!(ensure_unique_tier_title(&tiers, "Gold", None).is_ok());
        assert_eq!(
            ensure_unique_tier_title(&tiers, "Bronze", None).unwrap_err().status_code(),
            403
        );
        // An update may re-send its own current title
        assert!(ensure_unique_tier_title(&tiers, "Bronze", Some(1)).is_ok());
        assert!(ensure_unique_tier_title(&tiers, "Bronze", Some(2)).is_err());
    }

    #[test]
    fn last_tier_cannot_be_removed() {
        let one = vec![tier(1, "Bronze")];
        let err = ensure_not_last_tier(&one).unwrap_err();
        assert_eq!(err.status_code(), 403);

        let two = vec![tier(1, "Bronze"), tier(2, "Silver")];
        assert!(ensure_not_last_tier(&two).is_ok());
    }
}
