use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::db::models::{Card, User, UserCardDetail};

/// Public view of a user account; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSchema {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_staff: bool,
    pub city: String,
    pub phone_number: Option<String>,
    pub preferred_store: Option<String>,
    pub transaction_preference: Option<String>,
}

impl From<User> for UserSchema {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_staff: user.is_staff,
            city: user.city,
            phone_number: user.phone_number,
            preferred_store: user.preferred_store,
            transaction_preference: user.transaction_preference,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CardSchema {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: String,
}

impl From<Card> for CardSchema {
    fn from(card: Card) -> Self {
        Self {
            id: card.id,
            name: card.name,
            description: card.description,
            price: card.price.to_string(),
        }
    }
}

/// One collection row with its card, as shown in listings and search
/// results. Prices travel as strings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCardSchema {
    pub id: Uuid,
    pub card_id: Uuid,
    pub card_name: String,
    pub card_price: String,
    pub is_owned: bool,
    pub quantity_owned: i32,
    pub quantity_required: i32,
    pub total_price: String,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub owner_city: String,
    pub owner_preferred_store: Option<String>,
    pub owner_transaction_preference: Option<String>,
}

impl From<UserCardDetail> for UserCardSchema {
    fn from(row: UserCardDetail) -> Self {
        let total_price = row.total_price().to_string();
        Self {
            id: row.id,
            card_id: row.card_id,
            card_name: row.card_name,
            card_price: row.card_price.to_string(),
            is_owned: row.is_owned,
            quantity_owned: row.quantity_owned,
            quantity_required: row.quantity_required,
            total_price,
            owner_id: row.user_id,
            owner_username: row.owner_username,
            owner_city: row.owner_city,
            owner_preferred_store: row.owner_preferred_store,
            owner_transaction_preference: row.owner_transaction_preference,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CollectionResponse {
    pub owned_cards: Vec<UserCardSchema>,
    pub desired_cards: Vec<UserCardSchema>,
    pub total_collection_value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResultsResponse {
    pub searched_card: Option<String>,
    pub matching_cards: Vec<UserCardSchema>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSchema,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health,
        crate::handlers::cards::list_cards,
        crate::handlers::collection::get_collection,
        crate::handlers::notifications::list_notifications,
    ),
    components(schemas(
        UserSchema,
        CardSchema,
        UserCardSchema,
        CollectionResponse,
        SearchResultsResponse,
        LoginResponse,
        crate::db::models::Notification,
        crate::db::models::NotificationKind,
        crate::db::models::Exchange,
        crate::db::models::ExchangeStatus,
        crate::db::models::ExchangeKind,
        crate::handlers::HealthStatus,
        crate::handlers::DbPoolStats,
    )),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Cards", description = "Card catalog"),
        (name = "Collection", description = "Owned and desired cards"),
        (name = "Notifications", description = "Trade workflow notifications"),
    )
)]
pub struct ApiDoc;
