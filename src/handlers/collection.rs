use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::models::UserCard;
use crate::db::queries;
use crate::error::AppError;
use crate::schemas::{CollectionResponse, UserCardSchema};
use crate::validation;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/collection",
    responses((status = 200, description = "Owned and desired cards", body = CollectionResponse)),
    tag = "Collection"
)]
pub async fn get_collection(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let owned = queries::list_collection(&state.db, user.id, true).await?;
    let desired = queries::list_collection(&state.db, user.id, false).await?;
    let total = queries::collection_value(&state.db, user.id).await?;

    Ok(Json(CollectionResponse {
        owned_cards: owned.into_iter().map(UserCardSchema::from).collect(),
        desired_cards: desired.into_iter().map(UserCardSchema::from).collect(),
        total_collection_value: total.to_string(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterCardPayload {
    pub card_id: Uuid,
    /// "owned" or "desired".
    pub card_type: String,
    pub quantity_owned: Option<i32>,
    pub quantity_required: Option<i32>,
}

pub async fn register_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<RegisterCardPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_enum("card_type", &payload.card_type, &["owned", "desired"])?;
    let quantity_owned = payload.quantity_owned.unwrap_or(0);
    let quantity_required = payload.quantity_required.unwrap_or(0);
    validation::validate_quantity("quantity_owned", quantity_owned)?;
    validation::validate_quantity("quantity_required", quantity_required)?;

    let card = queries::get_card(&state.db, payload.card_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("Card {} not found", payload.card_id)))?;

    let user_card = queries::insert_user_card(
        &state.db,
        &UserCard::new(
            user.id,
            card.id,
            payload.card_type == "owned",
            quantity_owned,
            quantity_required,
        ),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user_card)))
}

/// Quick-add with zero quantities, the `is_owned` flag travelling in the
/// path as 0 or 1.
pub async fn quick_add_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path((card_id, is_owned)): Path<(Uuid, u8)>,
) -> Result<impl IntoResponse, AppError> {
    let card = queries::get_card(&state.db, card_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("Card {} not found", card_id)))?;

    let user_card = queries::insert_user_card(
        &state.db,
        &UserCard::new(user.id, card.id, is_owned != 0, 0, 0),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user_card)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityPayload {
    pub quantity: i32,
}

/// Updates the caller's row for a card: owned rows get `quantity_owned`,
/// wantlist rows get `quantity_required`.
pub async fn update_quantity(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(card_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityPayload>,
) -> Result<impl IntoResponse, AppError> {
    validation::validate_quantity("quantity", payload.quantity)?;

    let user_card = queries::get_user_card_for_card(&state.db, user.id, card_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(
                "The card does not exist or is not part of your collection".to_string(),
            )
        })?;

    let updated = queries::update_user_card_quantity(
        &state.db,
        user_card.id,
        user_card.is_owned,
        payload.quantity,
    )
    .await?;

    Ok(Json(updated))
}

pub async fn delete_card(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let removed = queries::delete_user_card(&state.db, id, user.id).await?;
    if removed == 0 {
        return Err(AppError::NotFound(format!(
            "Collection entry {} not found",
            id
        )));
    }

    Ok(Json(json!({ "status": "deleted" })))
}
