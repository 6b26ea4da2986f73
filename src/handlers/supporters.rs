use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::database::{petitions, support_tiers, supporters, DatabaseManager};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSupporterRequest {
    pub support_tier_id: i64,
    pub message: Option<String>,
}

/// Pledge admission: one pledge per tier per user, and owners cannot back
/// their own petitions.
fn ensure_pledge_allowed(
    already_pledged: bool,
    owner_id: i64,
    caller_id: i64,
) -> Result<(), ApiError> {
    if already_pledged {
        return Err(ApiError::forbidden("Forbidden: Already supported at this tier"));
    }
    if owner_id == caller_id {
        return Err(ApiError::forbidden("Forbidden: Cannot support your own petition"));
    }
    Ok(())
}

/// GET /petitions/:id/supporters - pledges newest first
pub async fn list(Path(petition_id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    if petitions::get_one(&pool, petition_id).await?.is_none() {
        return Err(ApiError::not_found("Not Found: No petition with ID"));
    }

    let rows = supporters::list_for_petition(&pool, petition_id).await?;
    let body: Vec<_> = rows
        .iter()
        .map(|s| {
            json!({
                "supportId": s.id,
                "supportTierId": s.support_tier_id,
                "message": s.message,
                "supporterId": s.user_id,
                "supporterFirstName": s.first_name,
                "supporterLastName": s.last_name,
                "timestamp": s.timestamp,
            })
        })
        .collect();

    Ok(Json(body))
}

/// POST /petitions/:id/supporters - a pledge is immutable once written
pub async fn add(
    Path(petition_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<AddSupporterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if matches!(&body.message, Some(m) if m.is_empty()) {
        return Err(ApiError::bad_request("Bad Request: message must not be empty"));
    }

    let pool = DatabaseManager::pool().await?;

    let petition = petitions::get_one(&pool, petition_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    let tier_exists = support_tiers::get(&pool, body.support_tier_id)
        .await?
        .map(|t| t.petition_id == petition_id)
        .unwrap_or(false);
    if !tier_exists {
        return Err(ApiError::not_found("Not Found: Support tier does not exist"));
    }

    let caller = auth::require_user(&pool, &headers).await?;

    let already_pledged = supporters::has_pledge(&pool, body.support_tier_id, caller.id).await?;
    ensure_pledge_allowed(already_pledged, petition.owner_id, caller.id)?;

    supporters::insert(&pool, petition_id, body.support_tier_id, caller.id, body.message.as_deref())
        .await?;

    Ok(StatusCode::CREATED)
}
