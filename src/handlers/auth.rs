use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{bearer_token, hash_password, hash_token, mint_session_token, verify_password};
use crate::db::models::{Session, User};
use crate::db::queries;
use crate::error::AppError;
use crate::schemas::{LoginResponse, UserSchema};
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub preferred_store: Option<String>,
    pub transaction_preference: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    let username = validation::sanitize_string(&payload.username);
    validation::validate_username(&username)?;
    validation::validate_email(&payload.email)?;
    validation::validate_password(&payload.password)?;

    if queries::get_user_by_username(&state.db, &username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Username '{}' is already taken",
            username
        )));
    }

    let mut user = User::new(
        username,
        validation::sanitize_string(&payload.email),
        hash_password(&payload.password)?,
    );
    if let Some(city) = payload.city {
        validation::validate_city(&city)?;
        user.city = city;
    }
    if let Some(phone) = payload.phone_number {
        validation::validate_max_len("phone_number", &phone, validation::PHONE_MAX_LEN)?;
        user.phone_number = Some(phone);
    }
    if let Some(store) = payload.preferred_store {
        validation::validate_preferred_store(&store)?;
        user.preferred_store = Some(store);
    }
    if let Some(preference) = payload.transaction_preference {
        validation::validate_transaction_preference(&preference)?;
        user.transaction_preference = Some(preference);
    }

    let created = queries::insert_user(&state.db, &user).await?;
    tracing::info!(username = %created.username, "account created");

    Ok((StatusCode::CREATED, Json(UserSchema::from(created))))
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = queries::get_user_by_username(&state.db, &payload.username)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    let (token, digest) = mint_session_token();
    queries::insert_session(
        &state.db,
        &Session::new(user.id, digest, state.config.session_ttl_hours),
    )
    .await?;

    tracing::info!(username = %user.username, "login");
    Ok(Json(LoginResponse {
        token,
        user: UserSchema::from(user),
    }))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&headers)?;
    let removed = queries::delete_session(&state.db, &hash_token(&token)).await?;
    if removed == 0 {
        return Err(AppError::Unauthorized("Invalid or expired session".to_string()));
    }

    Ok(Json(json!({ "status": "logged_out" })))
}
