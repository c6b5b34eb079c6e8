pub mod auth;
pub mod cardapi;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod imports;
pub mod middleware;
pub mod schemas;
pub mod services;
pub mod validation;

use axum::{
    Json,
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use crate::cardapi::CardApiClient;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub card_api: CardApiClient,
    pub config: Config,
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(schemas::ApiDoc::openapi()) }),
        )
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/cards", get(handlers::cards::list_cards).post(handlers::cards::create_card))
        .route("/cards/import", post(handlers::cards::import_cards))
        .route(
            "/collection",
            get(handlers::collection::get_collection).post(handlers::collection::register_card),
        )
        .route(
            "/collection/add/:card_id/:is_owned",
            post(handlers::collection::quick_add_card),
        )
        .route(
            "/collection/:card_id/quantity",
            put(handlers::collection::update_quantity),
        )
        .route("/collection/:id", delete(handlers::collection::delete_card))
        .route("/collection/upload", post(handlers::imports::upload_file))
        .route("/search/cards", get(handlers::search::search_cards))
        .route("/search/matches", get(handlers::search::search_matches))
        .route("/search/seekers", get(handlers::search::search_seekers))
        .route("/users/:id", get(handlers::profile::get_user_info))
        .route("/users/:id/cards", get(handlers::profile::get_user_cards))
        .route("/profile", put(handlers::profile::edit_profile))
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/send",
            post(handlers::notifications::send_notification),
        )
        .route(
            "/notifications/trade-request",
            post(handlers::notifications::send_trade_request),
        )
        .route(
            "/notifications/:id/accept",
            post(handlers::notifications::accept_notification),
        )
        .route(
            "/notifications/:id/reject",
            post(handlers::notifications::reject_notification),
        )
        .route(
            "/notifications/:id/reject-offer",
            post(handlers::notifications::reject_offer),
        )
        .route(
            "/notifications/mark-all-resolved",
            post(handlers::notifications::mark_all_resolved),
        )
        .route("/exchanges", get(handlers::exchanges::list_exchanges))
        .route(
            "/exchanges/pending",
            get(handlers::exchanges::pending_exchanges),
        )
        .route(
            "/exchanges/:id/accept",
            post(handlers::exchanges::accept_exchange),
        )
        .route(
            "/exchanges/:id/reject",
            post(handlers::exchanges::reject_exchange),
        )
        .route(
            "/offers/purchase",
            post(handlers::exchanges::make_purchase_offer),
        )
        .layer(axum::middleware::from_fn(
            middleware::request_logger::request_logger_middleware,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
