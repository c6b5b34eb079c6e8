use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::BigDecimal;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_staff: bool,
    pub city: String,
    pub phone_number: Option<String>,
    pub preferred_store: Option<String>,
    pub transaction_preference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            is_staff: false,
            city: "Quito".to_string(),
            phone_number: None,
            preferred_store: None,
            transaction_preference: Some("trade_and_sell".to_string()),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: BigDecimal,
}

impl Card {
    pub fn new(name: String, description: Option<String>, price: BigDecimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            price,
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_id: Uuid,
    pub is_owned: bool,
    pub quantity_owned: i32,
    pub quantity_required: i32,
    pub created_at: DateTime<Utc>,
}

impl UserCard {
    pub fn new(
        user_id: Uuid,
        card_id: Uuid,
        is_owned: bool,
        quantity_owned: i32,
        quantity_required: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            card_id,
            is_owned,
            quantity_owned,
            quantity_required,
            created_at: Utc::now(),
        }
    }
}

/// A collection row joined with its catalog card, as read back for listings
/// and searches.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserCardDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_id: Uuid,
    pub is_owned: bool,
    pub quantity_owned: i32,
    pub quantity_required: i32,
    pub card_name: String,
    pub card_price: BigDecimal,
    pub owner_username: String,
    pub owner_city: String,
    pub owner_preferred_store: Option<String>,
    pub owner_transaction_preference: Option<String>,
}

impl UserCardDetail {
    /// Value this row contributes to a collection: price x copies for owned
    /// rows, zero for wantlist rows.
    pub fn total_price(&self) -> BigDecimal {
        if self.is_owned {
            &self.card_price * BigDecimal::from(self.quantity_owned)
        } else {
            BigDecimal::from(0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "exchange_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "exchange_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    Sale,
    Trade,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Exchange {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub sender_cards: String,
    pub receiver_cards: String,
    pub status: ExchangeStatus,
    pub kind: ExchangeKind,
    pub created_at: DateTime<Utc>,
}

impl Exchange {
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        sender_cards: String,
        receiver_cards: String,
        kind: ExchangeKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            sender_cards,
            receiver_cards,
            status: ExchangeStatus::Pending,
            kind,
            created_at: Utc::now(),
        }
    }
}

/// Notification category. `Resolved` doubles as the lifecycle end state for
/// every category; `Purchase` keeps its historical wire value `compra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Action,
    Error,
    Exchange,
    Resolved,
    #[sqlx(rename = "compra")]
    #[serde(rename = "compra")]
    Purchase,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub message: String,
    pub kind: NotificationKind,
    pub is_read: bool,
    pub exchange_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        sender_id: Uuid,
        receiver_id: Uuid,
        message: String,
        kind: NotificationKind,
        exchange_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            message,
            kind,
            is_read: false,
            exchange_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Uuid, token_hash: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at: now,
            expires_at: now + chrono::Duration::hours(ttl_hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn detail(is_owned: bool, quantity_owned: i32, price: &str) -> UserCardDetail {
        UserCardDetail {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            card_id: Uuid::new_v4(),
            is_owned,
            quantity_owned,
            quantity_required: 0,
            card_name: "Lightning Bolt".to_string(),
            card_price: BigDecimal::from_str(price).unwrap(),
            owner_username: "ana".to_string(),
            owner_city: "Quito".to_string(),
            owner_preferred_store: None,
            owner_transaction_preference: Some("trade_and_sell".to_string()),
        }
    }

    #[test]
    fn owned_row_total_price_is_price_times_quantity() {
        let row = detail(true, 3, "2.50");
        assert_eq!(row.total_price(), BigDecimal::from_str("7.50").unwrap());
    }

    #[test]
    fn wantlist_row_total_price_is_zero() {
        let row = detail(false, 3, "2.50");
        assert_eq!(row.total_price(), BigDecimal::from(0));
    }

    #[test]
    fn new_exchange_starts_pending() {
        let ex = Exchange::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Lightning Bolt".to_string(),
            "Counterspell".to_string(),
            ExchangeKind::Trade,
        );
        assert_eq!(ex.status, ExchangeStatus::Pending);
    }

    #[test]
    fn purchase_kind_serializes_to_compra() {
        let json = serde_json::to_string(&NotificationKind::Purchase).unwrap();
        assert_eq!(json, "\"compra\"");
    }

    #[test]
    fn session_expiry_is_in_the_future() {
        let session = Session::new(Uuid::new_v4(), "digest".to_string(), 72);
        assert!(session.expires_at > session.created_at);
    }

    #[test]
    fn new_user_defaults() {
        let user = User::new(
            "ana".to_string(),
            "ana@example.com".to_string(),
            "hash".to_string(),
        );
        assert!(!user.is_staff);
        assert_eq!(user.city, "Quito");
        assert_eq!(user.transaction_preference.as_deref(), Some("trade_and_sell"));
    }
}
