use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;

use crate::auth::StaffUser;
use crate::db::models::Card;
use crate::db::queries;
use crate::error::AppError;
use crate::handlers::Pagination;
use crate::schemas::CardSchema;
use crate::services::importer;
use crate::validation;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/cards",
    responses((status = 200, description = "Card catalog", body = [CardSchema])),
    tag = "Cards"
)]
pub async fn list_cards(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let cards = queries::list_cards(&state.db, pagination.limit(), pagination.offset()).await?;
    let cards: Vec<CardSchema> = cards.into_iter().map(CardSchema::from).collect();
    Ok(Json(cards))
}

#[derive(Debug, Deserialize)]
pub struct CreateCardPayload {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<String>,
}

pub async fn create_card(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(payload): Json<CreateCardPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = validation::sanitize_string(&payload.name);
    validation::validate_card_name(&name)?;

    let price = match payload.price.as_deref() {
        Some(raw) => raw
            .parse::<BigDecimal>()
            .map_err(|_| AppError::Validation(format!("price: '{}' is not a decimal", raw)))?,
        None => BigDecimal::from(0),
    };
    validation::validate_price(&price)?;

    if queries::get_card_by_name(&state.db, &name).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Card '{}' already exists",
            name
        )));
    }

    let card = queries::insert_card(&state.db, &Card::new(name, payload.description, price)).await?;
    tracing::info!(card = %card.name, staff = %staff.username, "card created");

    Ok((StatusCode::CREATED, Json(CardSchema::from(card))))
}

#[derive(Debug, Deserialize)]
pub struct ImportCardsPayload {
    pub names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportCardsEntry {
    pub name: String,
    pub created: bool,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportCardsResponse {
    pub entries: Vec<ImportCardsEntry>,
}

/// Bulk catalog import by card name, resolved through the card-database
/// API.
pub async fn import_cards(
    State(state): State<AppState>,
    StaffUser(staff): StaffUser,
    Json(payload): Json<ImportCardsPayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.names.is_empty() {
        return Err(AppError::Validation(
            "names: provide at least one card name".to_string(),
        ));
    }
    for name in &payload.names {
        validation::validate_card_name(name)?;
    }

    let report = importer::import_catalog(&state.db, &state.card_api, &payload.names).await?;
    tracing::info!(staff = %staff.username, requested = payload.names.len(), "catalog import");

    let entries = report
        .into_iter()
        .map(|entry| ImportCardsEntry {
            name: entry.name,
            created: entry.created,
            error: entry.error,
        })
        .collect();
    Ok(Json(ImportCardsResponse { entries }))
}
