use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::database::models::User;
use crate::database::{users, DatabaseManager};
use crate::error::ApiError;
use crate::validation;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub current_password: Option<String>,
}

impl UpdateUserRequest {
    fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.password.is_none()
    }
}

/// POST /users/register
pub async fn register(Json(body): Json<RegisterRequest>) -> Result<impl IntoResponse, ApiError> {
    validation::validate_email(&body.email).map_err(ApiError::bad_request)?;
    validation::validate_name("firstName", &body.first_name).map_err(ApiError::bad_request)?;
    validation::validate_name("lastName", &body.last_name).map_err(ApiError::bad_request)?;
    validation::validate_password(&body.password).map_err(ApiError::bad_request)?;

    let pool = DatabaseManager::pool().await?;

    if users::find_by_email(&pool, &body.email).await?.is_some() {
        return Err(ApiError::forbidden("Email already in use"));
    }

    let password_hash = auth::hash_password(&body.password)?;
    let id = users::insert(&pool, &body.email, &body.first_name, &body.last_name, &password_hash)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "userId": id }))))
}

/// POST /users/login
pub async fn login(Json(body): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    validation::validate_email(&body.email).map_err(ApiError::bad_request)?;
    validation::validate_password(&body.password).map_err(ApiError::bad_request)?;

    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_email(&pool, &body.email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized: Incorrect email/password"))?;

    if !auth::verify_password(&body.password, &user.password_hash)? {
        return Err(ApiError::unauthorized("Unauthorized: Incorrect email/password"));
    }

    // A fresh token invalidates any prior session for this user
    let token = auth::generate_token();
    users::set_token(&pool, user.id, &token).await?;

    Ok(Json(json!({ "userId": user.id, "token": token })))
}

/// POST /users/logout
pub async fn logout(headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let token = auth::token_from_headers(&headers).ok_or_else(|| {
        ApiError::unauthorized("Unauthorized: Cannot log out if you are not authenticated")
    })?;

    let pool = DatabaseManager::pool().await?;

    // Zero cleared rows means the token was not an active session
    if users::clear_token(&pool, &token).await? == 0 {
        return Err(ApiError::unauthorized(
            "Unauthorized: Cannot log out if you are not authenticated",
        ));
    }

    Ok(StatusCode::OK)
}

/// Profile view body. The email appears only when the caller presents the
/// user's own active session token.
fn view_body(user: &User, caller_token: Option<&str>) -> serde_json::Value {
    let is_self =
        matches!((caller_token, user.auth_token.as_deref()), (Some(t), Some(u)) if t == u);

    if is_self {
        json!({
            "firstName": user.first_name,
            "lastName": user.last_name,
            "email": user.email,
        })
    } else {
        json!({
            "firstName": user.first_name,
            "lastName": user.last_name,
        })
    }
}

/// GET /users/:id - email is revealed only on self-view
pub async fn view(Path(id): Path<i64>, headers: HeaderMap) -> Result<impl IntoResponse, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let user = users::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No user with specified ID"))?;

    let caller_token = auth::token_from_headers(&headers);

    Ok(Json(view_body(&user, caller_token.as_deref())))
}

/// PATCH /users/:id - token-matching owner only; partial update
pub async fn update(
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request("Bad Request: no fields provided"));
    }
    if let Some(email) = &body.email {
        validation::validate_email(email).map_err(ApiError::bad_request)?;
    }
    if let Some(first_name) = &body.first_name {
        validation::validate_name("firstName", first_name).map_err(ApiError::bad_request)?;
    }
    if let Some(last_name) = &body.last_name {
        validation::validate_name("lastName", last_name).map_err(ApiError::bad_request)?;
    }
    if let Some(password) = &body.password {
        validation::validate_password(password).map_err(ApiError::bad_request)?;
    }

    let pool = DatabaseManager::pool().await?;
    let caller = auth::require_user(&pool, &headers).await?;

    let user = users::find_by_id(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not Found: No user with specified ID"))?;

    if caller.id != user.id {
        return Err(ApiError::forbidden("Forbidden: Can not edit another user's information"));
    }

    let password_hash = match &body.password {
        Some(new_password) => {
            let current = body.current_password.as_deref().ok_or_else(|| {
                ApiError::bad_request("Bad Request: currentPassword is required to change password")
            })?;
            if !auth::verify_password(current, &user.password_hash)? {
                return Err(ApiError::unauthorized("Unauthorized: Invalid currentPassword"));
            }
            // Reject no-op password changes
            if auth::verify_password(new_password, &user.password_hash)? {
                return Err(ApiError::forbidden(
                    "Forbidden: New password can not be the same as the current password",
                ));
            }
            auth::hash_password(new_password)?
        }
        None => user.password_hash.clone(),
    };

    if let Some(email) = &body.email {
        if *email != user.email && users::find_by_email(&pool, email).await?.is_some() {
            return Err(ApiError::forbidden("Email already in use"));
        }
    }

    let email = body.email.as_deref().unwrap_or(&user.email);
    let first_name = body.first_name.as_deref().unwrap_or(&user.first_name);
    let last_name = body.last_name.as_deref().unwrap_or(&user.last_name);

    users::update(&pool, id, email, first_name, last_name, &password_hash).await?;

    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(token: Option<&str>) -> User {
        User {
            id: 1,
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "hash".to_string(),
            auth_token: token.map(str::to_string),
            image_filename: None,
        }
    }

    #[test]
    fn self_view_includes_email() {
        let body = view_body(&user(Some("tok123")), Some("tok123"));
        assert_eq!(body["email"], "ada@example.com");
        assert_eq!(body["firstName"], "Ada");
    }

    #[test]
    fn other_callers_never_see_the_email() {
        let body = view_body(&user(Some("tok123")), Some("someone-else"));
        assert!(body.get("email").is_none());
        assert_eq!(body["lastName"], "Lovelace");

        let body = view_body(&user(Some("tok123")), None);
        assert!(body.get("email").is_none());
    }

    #[test]
    fn logged_out_profile_hides_email_even_with_a_stale_token() {
        let body = view_body(&user(None), Some("tok123"));
        assert!(body.get("email").is_none());
    }
}
