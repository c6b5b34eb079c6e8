use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::queries;
use crate::error::AppError;
use crate::schemas::{UserCardSchema, UserSchema};
use crate::services::exchange_flow::quoted_card_name;
use crate::validation;
use crate::AppState;

pub async fn get_user_info(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = queries::get_user(&state.db, user_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("User {} not found", user_id)))?;

    Ok(Json(UserSchema::from(user)))
}

#[derive(Debug, Deserialize)]
pub struct UserCardsParams {
    pub notification_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UserCardsResponse {
    pub selected_user: UserSchema,
    pub user_cards: Vec<UserCardSchema>,
    /// Card the viewer was asked about, recovered from the notification
    /// message when one is referenced.
    pub searched_card: Option<String>,
}

pub async fn get_user_cards(
    State(state): State<AppState>,
    AuthUser(viewer): AuthUser,
    Path(user_id): Path<Uuid>,
    Query(params): Query<UserCardsParams>,
) -> Result<impl IntoResponse, AppError> {
    let selected_user = queries::get_user(&state.db, user_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("User {} not found", user_id)))?;

    let user_cards = queries::list_collection(&state.db, selected_user.id, true).await?;

    // A notification that is missing, not ours, or oddly worded just means
    // no highlighted card.
    let mut searched_card = None;
    if let Some(notification_id) = params.notification_id {
        if let Some(notification) =
            queries::get_notification(&state.db, notification_id, viewer.id).await?
        {
            searched_card = quoted_card_name(&notification.message);
        }
    }

    Ok(Json(UserCardsResponse {
        selected_user: UserSchema::from(selected_user),
        user_cards: user_cards.into_iter().map(UserCardSchema::from).collect(),
        searched_card,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EditProfilePayload {
    pub city: Option<String>,
    pub phone_number: Option<String>,
    pub preferred_store: Option<String>,
    pub transaction_preference: Option<String>,
}

pub async fn edit_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<EditProfilePayload>,
) -> Result<impl IntoResponse, AppError> {
    let city = match payload.city {
        Some(city) => {
            validation::validate_city(&city)?;
            city
        }
        None => user.city.clone(),
    };
    let phone_number = match payload.phone_number {
        Some(phone) => {
            validation::validate_max_len("phone_number", &phone, validation::PHONE_MAX_LEN)?;
            Some(phone)
        }
        None => user.phone_number.clone(),
    };
    let preferred_store = match payload.preferred_store {
        Some(store) => {
            validation::validate_preferred_store(&store)?;
            Some(store)
        }
        None => user.preferred_store.clone(),
    };
    let transaction_preference = match payload.transaction_preference {
        Some(preference) => {
            validation::validate_transaction_preference(&preference)?;
            Some(preference)
        }
        None => user.transaction_preference.clone(),
    };

    let updated = queries::update_profile(
        &state.db,
        user.id,
        &city,
        phone_number.as_deref(),
        preferred_store.as_deref(),
        transaction_preference.as_deref(),
    )
    .await?;

    tracing::info!(username = %updated.username, "profile updated");
    Ok(Json(UserSchema::from(updated)))
}
