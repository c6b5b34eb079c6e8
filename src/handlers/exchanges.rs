use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::models::{Exchange, Notification};
use crate::db::queries;
use crate::error::AppError;
use crate::handlers::Pagination;
use crate::services::exchange_flow::{self, PurchaseOffer};
use crate::validation;
use crate::AppState;

pub async fn list_exchanges(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let exchanges =
        queries::list_exchanges(&state.db, pagination.limit(), pagination.offset()).await?;
    Ok(Json(exchanges))
}

/// Pending exchanges the caller is part of, on either side.
pub async fn pending_exchanges(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let exchanges = queries::list_pending_exchanges_for_user(&state.db, user.id).await?;
    Ok(Json(exchanges))
}

pub async fn accept_exchange(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exchange = exchange_flow::accept_exchange(&state.db, &user, id).await?;
    Ok(Json(exchange))
}

pub async fn reject_exchange(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let exchange = exchange_flow::reject_exchange(&state.db, &user, id).await?;
    Ok(Json(exchange))
}

#[derive(Debug, Deserialize)]
pub struct PurchaseOfferPayload {
    /// Owner of the card being bought.
    pub owner_id: Uuid,
    pub card_name: String,
}

#[derive(Debug, Serialize)]
pub struct PurchaseOfferResponse {
    pub exchange: Exchange,
    pub notification: Notification,
}

pub async fn make_purchase_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<PurchaseOfferPayload>,
) -> Result<impl IntoResponse, AppError> {
    let card_name = validation::sanitize_string(&payload.card_name);
    validation::validate_card_name(&card_name)?;

    let (exchange, notification) = exchange_flow::make_purchase_offer(
        &state.db,
        &user,
        PurchaseOffer {
            owner_id: payload.owner_id,
            card_name,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseOfferResponse {
            exchange,
            notification,
        }),
    ))
}
