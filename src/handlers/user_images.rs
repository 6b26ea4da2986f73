use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::auth;
use crate::database::{users, DatabaseManager};
use crate::error::ApiError;
use crate::images;

/// GET /users/:id/image - no auth; serves the raw file
pub async fn get(Path(id): Path<i64>) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No user with specified ID"))?;

    let filename = user
        .image_filename
        .ok_or_else(|| ApiError::not_found("Not Found: User has no image"))?;

    let bytes = images::load(&filename).await?;
    let content_type = images::content_type_for_filename(&filename).ok_or_else(|| {
        tracing::error!("Stored image filename has unknown extension: {}", filename);
        ApiError::internal_server_error("An error occurred while processing your request")
    })?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// PUT /users/:id/image - self only; 201 on first upload, 200 on replace
pub async fn put(
    Path(id): Path<i64>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let caller = auth::require_user(&pool, &headers).await?;

    let user = users::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No user with specified ID"))?;

    if caller.id != user.id {
        return Err(ApiError::forbidden("Forbidden: Can not change another user's image"));
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

    let created = user.image_filename.is_none();
    let filename = format!("user_{}.{}", id, ext);

    images::save(&filename, &body).await?;
    users::set_image(&pool, id, &filename).await?;

    // A replacement may change the extension; drop the orphaned file
    if let Some(old) = user.image_filename.filter(|old| *old != filename) {
        images::remove(&old).await;
    }

    Ok(if created { StatusCode::CREATED } else { StatusCode::OK })
}

/// DELETE /users/:id/image - self only
pub async fn delete(Path(id): Path<i64>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let caller = auth::require_user(&pool, &headers).await?;

    let user = users::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No user with specified ID"))?;

    if caller.id != user.id {
        return Err(ApiError::forbidden("Forbidden: Can not delete another user's image"));
    }

    let filename = user
        .image_filename
        .ok_or_else(|| ApiError::not_found("Not Found: User has no image"))?;

    users::clear_image(&pool, id).await?;
    images::remove(&filename).await;

    Ok(StatusCode::OK)
}
