use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::models::{Exchange, Notification};
use crate::db::queries;
use crate::error::AppError;
use crate::handlers::Pagination;
use crate::services::exchange_flow::{self, TradeRequest};
use crate::validation;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/notifications",
    responses((status = 200, description = "Unresolved notifications, newest first", body = [Notification])),
    tag = "Notifications"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let notifications = queries::list_unresolved_notifications(
        &state.db,
        user.id,
        pagination.limit(),
        pagination.offset(),
    )
    .await?;

    Ok(Json(notifications))
}

#[derive(Debug, Deserialize)]
pub struct SendNotificationPayload {
    pub card_name: String,
    pub owner_id: Uuid,
}

/// "I'm looking for this card" note to one of its owners.
pub async fn send_notification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<SendNotificationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let card_name = validation::sanitize_string(&payload.card_name);
    validation::validate_card_name(&card_name)?;

    let notification =
        exchange_flow::send_interest_notification(&state.db, &user, payload.owner_id, &card_name)
            .await?;

    Ok((StatusCode::CREATED, Json(notification)))
}

#[derive(Debug, Deserialize)]
pub struct TradeRequestPayload {
    /// Receiver of the offer.
    pub user_id: Uuid,
    pub desired_card: String,
    pub selected_cards: Vec<String>,
    pub notification_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TradeRequestResponse {
    pub exchange: Exchange,
    pub notification: Notification,
}

pub async fn send_trade_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<TradeRequestPayload>,
) -> Result<impl IntoResponse, AppError> {
    let desired_card = validation::sanitize_string(&payload.desired_card);
    validation::validate_card_name(&desired_card)?;

    let (exchange, notification) = exchange_flow::send_trade_request(
        &state.db,
        &user,
        TradeRequest {
            receiver_id: payload.user_id,
            desired_card,
            offered_cards: payload.selected_cards,
            notification_id: payload.notification_id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TradeRequestResponse {
            exchange,
            notification,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct AcceptNotificationResponse {
    pub notification: Notification,
    pub pending_exchange: Option<Exchange>,
    pub sender_id: Uuid,
}

pub async fn accept_notification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = exchange_flow::accept_notification(&state.db, &user, id).await?;

    Ok(Json(AcceptNotificationResponse {
        notification: outcome.notification,
        pending_exchange: outcome.pending_exchange,
        sender_id: outcome.sender_id,
    }))
}

pub async fn reject_notification(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = exchange_flow::reject_notification(&state.db, &user, id, false).await?;
    Ok(Json(resolved))
}

/// Like reject, but worded for a concrete offer that was on the table.
pub async fn reject_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resolved = exchange_flow::reject_notification(&state.db, &user, id, true).await?;
    Ok(Json(resolved))
}

pub async fn mark_all_resolved(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let resolved = queries::resolve_all_notifications(&state.db, user.id).await?;
    Ok(Json(json!({ "status": "ok", "resolved": resolved })))
}
