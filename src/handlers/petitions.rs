use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;

use crate::auth;
use crate::database::models::PetitionSummary;
use crate::database::petitions::{PetitionFilter, PetitionSort};
use crate::database::support_tiers::NewSupportTier;
use crate::database::{categories, petitions, support_tiers, supporters, DatabaseManager};
use crate::error::ApiError;
use crate::validation;

/// Raw query parameters for GET /petitions. Numbers arrive as strings so the
/// handler can report invalid values as 400 rather than a framework error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetitionSearchParams {
    pub start_index: Option<String>,
    pub count: Option<String>,
    pub q: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
    pub supporting_cost: Option<String>,
    pub owner_id: Option<String>,
    pub supporter_id: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PetitionOverview {
    petition_id: i64,
    title: String,
    category_id: i64,
    owner_id: i64,
    owner_first_name: String,
    owner_last_name: String,
    number_of_supporters: i64,
    creation_date: DateTime<Utc>,
    supporting_cost: Option<i32>,
}

impl From<&PetitionSummary> for PetitionOverview {
    fn from(row: &PetitionSummary) -> Self {
        Self {
            petition_id: row.id,
            title: row.title.clone(),
            category_id: row.category_id,
            owner_id: row.owner_id,
            owner_first_name: row.first_name.clone(),
            owner_last_name: row.last_name.clone(),
            number_of_supporters: row.number_of_supporters,
            creation_date: row.creation_date,
            supporting_cost: row.supporting_cost,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetitionRequest {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub support_tiers: Vec<TierPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPayload {
    pub title: String,
    pub description: String,
    pub cost: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetitionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

/// Window a fully filtered and sorted result set. The caller reports the
/// pre-window length as the response count, so pagination never changes the
/// total the client sees.
/// A petition with pledges is permanent.
fn ensure_no_supporters(supporter_count: i64) -> Result<(), ApiError> {
    if supporter_count > 0 {
        return Err(ApiError::forbidden("Forbidden: Petition has supporters"));
    }
    Ok(())
}

fn paginate<T>(rows: &[T], start_index: usize, count: Option<usize>) -> &[T] {
    let start = start_index.min(rows.len());
    let end = match count {
        Some(n) => start.saturating_add(n).min(rows.len()),
        None => rows.len(),
    };
    &rows[start..end]
}

/// GET /petitions
pub async fn list(Query(params): Query<PetitionSearchParams>) -> Result<impl IntoResponse, ApiError> {
    let start_index = validation::parse_int_param("startIndex", params.start_index.as_deref())
        .map_err(ApiError::bad_request)?
        .unwrap_or(0);
    let count = validation::parse_int_param("count", params.count.as_deref())
        .map_err(ApiError::bad_request)?;
    if start_index < 0 || matches!(count, Some(c) if c < 0) {
        return Err(ApiError::bad_request("Bad Request: invalid pagination"));
    }

    let supporting_cost = validation::parse_int_param("supportingCost", params.supporting_cost.as_deref())
        .map_err(ApiError::bad_request)?
        .map(i32::try_from)
        .transpose()
        .map_err(|_| ApiError::bad_request("Bad Request: invalid number for supportingCost"))?;
    let owner_id = validation::parse_int_param("ownerId", params.owner_id.as_deref())
        .map_err(ApiError::bad_request)?;
    let supporter_id = validation::parse_int_param("supporterId", params.supporter_id.as_deref())
        .map_err(ApiError::bad_request)?;

    let mut category_ids = Vec::with_capacity(params.category_ids.len());
    for raw in &params.category_ids {
        let id = validation::parse_int_param("categoryIds", Some(raw))
            .map_err(ApiError::bad_request)?
            .unwrap_or_default();
        category_ids.push(id);
    }

    let sort = match params.sort_by.as_deref() {
        None => PetitionSort::default(),
        Some(raw) => PetitionSort::from_param(raw)
            .ok_or_else(|| ApiError::bad_request("Bad Request: invalid sortBy"))?,
    };

    let filter = PetitionFilter {
        q: params.q.filter(|q| !q.is_empty()),
        category_ids,
        supporting_cost,
        owner_id,
        supporter_id,
        sort,
    };

    let pool = DatabaseManager::pool().await?;
    let rows = petitions::search(&pool, &filter).await?;

    let window = paginate(&rows, start_index as usize, count.map(|c| c as usize));
    let page: Vec<PetitionOverview> = window.iter().map(PetitionOverview::from).collect();

    Ok(Json(json!({
        // Total filtered matches, independent of the pagination window
        "count": rows.len(),
        "petitions": page,
    })))
}

/// GET /petitions/:id
pub async fn get_one(Path(id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let petition = petitions::get_one(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    let tiers = support_tiers::list_for_petition(&pool, id).await?;
    let number_of_supporters = supporters::count_for_petition(&pool, id).await?;
    let money_raised = supporters::money_raised(&pool, id).await?;

    let tier_list: Vec<_> = tiers
        .iter()
        .map(|t| {
            json!({
                "supportTierId": t.id,
                "title": t.title,
                "description": t.description,
                "cost": t.cost,
            })
        })
        .collect();

    Ok(Json(json!({
        "petitionId": petition.id,
        "title": petition.title,
        "categoryId": petition.category_id,
        "ownerId": petition.owner_id,
        "ownerFirstName": petition.first_name,
        "ownerLastName": petition.last_name,
        "numberOfSupporters": number_of_supporters,
        "creationDate": petition.creation_date,
        "description": petition.description,
        "moneyRaised": money_raised,
        "supportTiers": tier_list,
    })))
}

/// POST /petitions - petition and its initial tiers land atomically
pub async fn create(
    headers: HeaderMap,
    Json(body): Json<CreatePetitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_title(&body.title).map_err(ApiError::bad_request)?;
    validation::validate_description(&body.description).map_err(ApiError::bad_request)?;
    if body.support_tiers.is_empty() || body.support_tiers.len() > 3 {
        return Err(ApiError::bad_request("Bad Request: Invalid number of support tiers"));
    }
    let mut seen_titles = HashSet::new();
    for tier in &body.support_tiers {
        validation::validate_title(&tier.title).map_err(ApiError::bad_request)?;
        validation::validate_description(&tier.description).map_err(ApiError::bad_request)?;
        validation::validate_cost(tier.cost).map_err(ApiError::bad_request)?;
        if !seen_titles.insert(tier.title.as_str()) {
            return Err(ApiError::bad_request("Bad Request: Support tier titles must be unique"));
        }
    }

    let pool = DatabaseManager::pool().await?;
    let caller = auth::require_user(&pool, &headers).await?;

    if !categories::exists(&pool, body.category_id).await? {
        return Err(ApiError::bad_request("Bad Request: Invalid category ID"));
    }
    if petitions::title_exists(&pool, &body.title, None).await? {
        return Err(ApiError::bad_request("Bad Request: Title already exists"));
    }

    let tiers: Vec<NewSupportTier> = body
        .support_tiers
        .iter()
        .map(|t| NewSupportTier {
            title: t.title.clone(),
            description: t.description.clone(),
            cost: t.cost,
        })
        .collect();

    let petition_id =
        petitions::create(&pool, &body.title, &body.description, body.category_id, caller.id, &tiers)
            .await?;

    Ok((StatusCode::CREATED, Json(json!({ "petitionId": petition_id }))))
}

/// PATCH /petitions/:id - owner only; omitted fields keep current values
pub async fn edit(
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdatePetitionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(title) = &body.title {
        validation::validate_title(title).map_err(ApiError::bad_request)?;
    }
    if let Some(description) = &body.description {
        validation::validate_description(description).map_err(ApiError::bad_request)?;
    }

    let pool = DatabaseManager::pool().await?;
    let caller = auth::require_user(&pool, &headers).await?;

    let petition = petitions::get_one(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    if petition.owner_id != caller.id {
        return Err(ApiError::forbidden("Forbidden: User is not the owner of the petition"));
    }

    if let Some(title) = &body.title {
        if *title != petition.title && petitions::title_exists(&pool, title, Some(id)).await? {
            return Err(ApiError::forbidden("Forbidden: Petition title already exists"));
        }
    }
    if let Some(category_id) = body.category_id {
        if !categories::exists(&pool, category_id).await? {
            return Err(ApiError::bad_request("Bad Request: Invalid category ID"));
        }
    }

    let title = body.title.as_deref().unwrap_or(&petition.title);
    let description = body.description.as_deref().unwrap_or(&petition.description);
    let category_id = body.category_id.unwrap_or(petition.category_id);

    petitions::update(&pool, id, title, description, category_id).await?;

    Ok(StatusCode::OK)
}

/// DELETE /petitions/:id - only while the petition has zero supporters
pub async fn delete(Path(id): Path<i64>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let caller = auth::require_user(&pool, &headers).await?;

    let petition = petitions::get_one(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    if petition.owner_id != caller.id {
        return Err(ApiError::forbidden("Forbidden: User is not the owner of the petition"));
    }
    ensure_no_supporters(supporters::count_for_petition(&pool, id).await?)?;

    petitions::delete(&pool, id).await?;

    Ok(StatusCode::OK)
}

/// GET /petitions/categories
pub async fn list_categories() -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let rows = categories::list(&pool).await?;

    let body: Vec<_> = rows
        .iter()
        .map(|c| json!({ "categoryId": c.id, "name": c.name }))
        .collect();

    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_windows_after_the_full_set() {
        let rows = vec![1, 2, 3, 4, 5];
        assert_eq!(paginate(&rows, 0, None), &[1, 2, 3, 4, 5]);
        assert_eq!(paginate(&rows, 1, Some(2)), &[2, 3]);
        assert_eq!(paginate(&rows, 3, None), &[4, 5]);
        assert_eq!(paginate(&rows, 4, Some(10)), &[5]);
    }

    #[test]
    fn pagination_clamps_out_of_range_windows() {
        let rows = vec![1, 2, 3];
        assert!(paginate(&rows, 5, None).is_empty());
        assert!(paginate(&rows, 3, Some(1)).is_empty());
        assert_eq!(paginate(&rows, 0, Some(0)), &[] as &[i32]);
    }

    #[test]
    fn petitions_with_supporters_are_undeletable() {
        assert!(ensure_no_supporters(0).is_ok());
        let err = ensure_no_supporters(1).unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "Forbidden: Petition has supporters");
    }

    #[test]
    fn overview_maps_store_row_to_api_shape() {
        let row = PetitionSummary {
            id: 7,
            title: "Save the bees".to_string(),
            category_id: 2,
            owner_id: 4,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            creation_date: Utc::now(),
            supporting_cost: Some(5),
            number_of_supporters: 3,
        };
        let overview = PetitionOverview::from(&row);
        assert_eq!(overview.petition_id, 7);
        assert_eq!(overview.owner_first_name, "Ada");
        assert_eq!(overview.supporting_cost, Some(5));
    }
}
