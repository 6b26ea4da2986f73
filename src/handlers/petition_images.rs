use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::auth;
use crate::database::{petitions, DatabaseManager};
use crate::error::ApiError;
use crate::images;

/// GET /petitions/:id/image - no auth; serves the raw file
pub async fn get(Path(id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let petition = petitions::get_one(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    let filename = petition
        .image_filename
        .ok_or_else(|| ApiError::not_found("Not Found: Petition has no image"))?;

    let bytes = images::load(&filename).await?;
    let content_type = images::content_type_for_filename(&filename).ok_or_else(|| {
        tracing::error!("Stored image filename has unknown extension: {}", filename);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// PUT /petitions/:id/image - owner only; 201 on first upload, 200 on replace
pub async fn put(
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let petition = petitions::get_one(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    let caller = auth::require_user(&pool, &headers).await?;
    if caller.id != petition.owner_id {
        return Err(ApiError::forbidden("Forbidden: User is not the owner of the petition"));
    }

    if body.is_empty() {
        return Err(ApiError::bad_request("Bad Request: No image provided"));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Bad Request: No Content-Type provided"))?;
    let ext = images::extension_for_content_type(content_type)
        .ok_or_else(|| ApiError::bad_request("Bad Request: Invalid file type"))?;

    let created = petition.image_filename.is_none();
    let filename = format!("petition_{}.{}", id, ext);

    images::save(&filename, &body).await?;
    petitions::set_image(&pool, id, &filename).await?;

    if let Some(old) = petition.image_filename.filter(|old| *old != filename) {
        images::remove(&old).await;
    }

    Ok(if created { StatusCode::CREATED } else { StatusCode::OK })
}

/// DELETE /petitions/:id/image - owner only
pub async fn delete(Path(id): Path<i64>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let petition = petitions::get_one(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No petition with ID"))?;

    let caller = auth::require_user(&pool, &headers).await?;
    if caller.id != petition.owner_id {
        return Err(ApiError::forbidden("Forbidden: User is not the owner of the petition"));
    }

    let filename = petition
        .image_filename
        .ok_or_else(|| ApiError::not_found("Not Found: Petition has no image"))?;

    petitions::clear_image(&pool, id).await?;
    images::remove(&filename).await;

    Ok(StatusCode::OK)
}
