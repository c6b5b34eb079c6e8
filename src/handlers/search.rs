use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::db::models::UserCardDetail;
use crate::db::queries;
use crate::error::AppError;
use crate::schemas::{SearchResultsResponse, UserCardSchema};
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub card_name: Option<String>,
}

impl SearchParams {
    fn card_name(&self) -> Option<String> {
        let name = validation::sanitize_string(self.card_name.as_deref().unwrap_or(""));
        if name.is_empty() { None } else { Some(name) }
    }
}

fn results(
    searched_card: Option<String>,
    rows: Vec<UserCardDetail>,
) -> Json<SearchResultsResponse> {
    Json(SearchResultsResponse {
        searched_card,
        matching_cards: rows.into_iter().map(UserCardSchema::from).collect(),
    })
}

/// Substring search over other users' owned cards. An empty query is an
/// empty result, not an error.
pub async fn search_cards(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let Some(card_name) = params.card_name() else {
        return Ok(results(None, Vec::new()));
    };

    let rows = queries::search_owned_cards_like(&state.db, &card_name, user.id).await?;
    Ok(results(None, rows))
}

/// Exact-name matches among other users' owned cards.
pub async fn search_matches(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let Some(card_name) = params.card_name() else {
        return Ok(results(None, Vec::new()));
    };

    let rows = queries::search_owned_cards_exact(&state.db, &card_name, user.id).await?;
    Ok(results(Some(card_name), rows))
}

/// Other users whose wantlist contains the card.
pub async fn search_seekers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let Some(card_name) = params.card_name() else {
        return Ok(results(None, Vec::new()));
    };

    let rows = queries::search_desired_cards_exact(&state.db, &card_name, user.id).await?;
    Ok(results(Some(card_name), rows))
}
