use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::db::models::{
    Card, Exchange, ExchangeStatus, Notification, Session, User, UserCard, UserCardDetail,
};

const USER_CARD_DETAIL_SELECT: &str = r#"
    SELECT uc.id, uc.user_id, uc.card_id, uc.is_owned,
           uc.quantity_owned, uc.quantity_required,
           c.name AS card_name, c.price AS card_price,
           u.username AS owner_username, u.city AS owner_city,
           u.preferred_store AS owner_preferred_store,
           u.transaction_preference AS owner_transaction_preference
    FROM user_cards uc
    JOIN cards c ON c.id = uc.card_id
    JOIN users u ON u.id = uc.user_id
"#;

// --- User queries ---

pub async fn insert_user(pool: &PgPool, user: &User) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (
            id, username, email, password_hash, is_staff, city,
            phone_number, preferred_store, transaction_preference, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.is_staff)
    .bind(&user.city)
    .bind(&user.phone_number)
    .bind(&user.preferred_store)
    .bind(&user.transaction_preference)
    .bind(user.created_at)
    .fetch_one(pool)
    .await
}

pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    city: &str,
    phone_number: Option<&str>,
    preferred_store: Option<&str>,
    transaction_preference: Option<&str>,
) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET city = $2, phone_number = $3, preferred_store = $4, transaction_preference = $5
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(city)
    .bind(phone_number)
    .bind(preferred_store)
    .bind(transaction_preference)
    .fetch_one(pool)
    .await
}

/// Fills the default transaction preference for accounts created before the
/// column existed. Returns the number of rows touched.
pub async fn backfill_profiles(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE users SET transaction_preference = 'trade_and_sell' WHERE transaction_preference IS NULL",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

// --- Session queries ---

pub async fn insert_session(pool: &PgPool, session: &Session) -> Result<Session> {
    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(session.id)
    .bind(session.user_id)
    .bind(&session.token_hash)
    .bind(session.created_at)
    .bind(session.expires_at)
    .fetch_one(pool)
    .await
}

pub async fn get_session_user(pool: &PgPool, token_hash: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN sessions s ON s.user_id = u.id
        WHERE s.token_hash = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await
}

pub async fn delete_session(pool: &PgPool, token_hash: &str) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// --- Card catalog queries ---

pub async fn insert_card(pool: &PgPool, card: &Card) -> Result<Card> {
    sqlx::query_as::<_, Card>(
        r#"
        INSERT INTO cards (id, name, description, price)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(card.id)
    .bind(&card.name)
    .bind(&card.description)
    .bind(&card.price)
    .fetch_one(pool)
    .await
}

pub async fn get_card(pool: &PgPool, id: Uuid) -> Result<Card> {
    sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_card_by_name(pool: &PgPool, name: &str) -> Result<Option<Card>> {
    sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE LOWER(name) = LOWER($1)")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn list_cards(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Card>> {
    sqlx::query_as::<_, Card>("SELECT * FROM cards ORDER BY name LIMIT $1 OFFSET $2")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

// --- Collection queries ---

pub async fn insert_user_card(pool: &PgPool, user_card: &UserCard) -> Result<UserCard> {
    sqlx::query_as::<_, UserCard>(
        r#"
        INSERT INTO user_cards (
            id, user_id, card_id, is_owned, quantity_owned, quantity_required, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(user_card.id)
    .bind(user_card.user_id)
    .bind(user_card.card_id)
    .bind(user_card.is_owned)
    .bind(user_card.quantity_owned)
    .bind(user_card.quantity_required)
    .bind(user_card.created_at)
    .fetch_one(pool)
    .await
}

pub async fn delete_user_card(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM user_cards WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn get_user_card_for_card(
    pool: &PgPool,
    user_id: Uuid,
    card_id: Uuid,
) -> Result<Option<UserCard>> {
    sqlx::query_as::<_, UserCard>(
        "SELECT * FROM user_cards WHERE user_id = $1 AND card_id = $2 ORDER BY created_at LIMIT 1",
    )
    .bind(user_id)
    .bind(card_id)
    .fetch_optional(pool)
    .await
}

/// Updates the quantity that matters for the row: owned copies for binder
/// rows, wanted copies for wantlist rows.
pub async fn update_user_card_quantity(
    pool: &PgPool,
    id: Uuid,
    is_owned: bool,
    quantity: i32,
) -> Result<UserCard> {
    let sql = if is_owned {
        "UPDATE user_cards SET quantity_owned = $2 WHERE id = $1 RETURNING *"
    } else {
        "UPDATE user_cards SET quantity_required = $2 WHERE id = $1 RETURNING *"
    };
    sqlx::query_as::<_, UserCard>(sql)
        .bind(id)
        .bind(quantity)
        .fetch_one(pool)
        .await
}

pub async fn list_collection(
    pool: &PgPool,
    user_id: Uuid,
    is_owned: bool,
) -> Result<Vec<UserCardDetail>> {
    let sql = format!(
        "{USER_CARD_DETAIL_SELECT} WHERE uc.user_id = $1 AND uc.is_owned = $2 ORDER BY c.name"
    );
    sqlx::query_as::<_, UserCardDetail>(&sql)
        .bind(user_id)
        .bind(is_owned)
        .fetch_all(pool)
        .await
}

pub async fn collection_value(pool: &PgPool, user_id: Uuid) -> Result<BigDecimal> {
    let total: Option<BigDecimal> = sqlx::query_scalar(
        r#"
        SELECT SUM(c.price * uc.quantity_owned)
        FROM user_cards uc
        JOIN cards c ON c.id = uc.card_id
        WHERE uc.user_id = $1 AND uc.is_owned = TRUE
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(total.unwrap_or_else(|| BigDecimal::from(0)))
}

// --- Search queries ---

pub async fn search_owned_cards_like(
    pool: &PgPool,
    card_name: &str,
    exclude_user: Uuid,
) -> Result<Vec<UserCardDetail>> {
    let sql = format!(
        "{USER_CARD_DETAIL_SELECT} \
         WHERE c.name ILIKE $1 AND uc.user_id <> $2 AND uc.is_owned = TRUE \
         ORDER BY c.name, u.username"
    );
    sqlx::query_as::<_, UserCardDetail>(&sql)
        .bind(format!("%{}%", card_name))
        .bind(exclude_user)
        .fetch_all(pool)
        .await
}

pub async fn search_owned_cards_exact(
    pool: &PgPool,
    card_name: &str,
    exclude_user: Uuid,
) -> Result<Vec<UserCardDetail>> {
    let sql = format!(
        "{USER_CARD_DETAIL_SELECT} \
         WHERE LOWER(c.name) = LOWER($1) AND uc.user_id <> $2 AND uc.is_owned = TRUE \
         ORDER BY u.username"
    );
    sqlx::query_as::<_, UserCardDetail>(&sql)
        .bind(card_name)
        .bind(exclude_user)
        .fetch_all(pool)
        .await
}

pub async fn search_desired_cards_exact(
    pool: &PgPool,
    card_name: &str,
    exclude_user: Uuid,
) -> Result<Vec<UserCardDetail>> {
    let sql = format!(
        "{USER_CARD_DETAIL_SELECT} \
         WHERE LOWER(c.name) = LOWER($1) AND uc.user_id <> $2 AND uc.is_owned = FALSE \
         ORDER BY u.username"
    );
    sqlx::query_as::<_, UserCardDetail>(&sql)
        .bind(card_name)
        .bind(exclude_user)
        .fetch_all(pool)
        .await
}

// --- Exchange queries ---

pub async fn insert_exchange(
    executor: &mut SqlxTransaction<'_, Postgres>,
    exchange: &Exchange,
) -> Result<Exchange> {
    sqlx::query_as::<_, Exchange>(
        r#"
        INSERT INTO exchanges (
            id, sender_id, receiver_id, sender_cards, receiver_cards, status, kind, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(exchange.id)
    .bind(exchange.sender_id)
    .bind(exchange.receiver_id)
    .bind(&exchange.sender_cards)
    .bind(&exchange.receiver_cards)
    .bind(exchange.status)
    .bind(exchange.kind)
    .bind(exchange.created_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn get_exchange(pool: &PgPool, id: Uuid) -> Result<Exchange> {
    sqlx::query_as::<_, Exchange>("SELECT * FROM exchanges WHERE id = $1")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn list_exchanges(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Exchange>> {
    sqlx::query_as::<_, Exchange>(
        "SELECT * FROM exchanges ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn list_pending_exchanges_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Exchange>> {
    sqlx::query_as::<_, Exchange>(
        r#"
        SELECT * FROM exchanges
        WHERE status = 'pending' AND (sender_id = $1 OR receiver_id = $1)
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Earliest pending exchange between a pair. More than one can exist; the
/// caller gets the first in creation order.
pub async fn find_pending_exchange_between(
    executor: &mut SqlxTransaction<'_, Postgres>,
    sender_id: Uuid,
    receiver_id: Uuid,
) -> Result<Option<Exchange>> {
    sqlx::query_as::<_, Exchange>(
        r#"
        SELECT * FROM exchanges
        WHERE sender_id = $1 AND receiver_id = $2 AND status = 'pending'
        ORDER BY created_at
        LIMIT 1
        "#,
    )
    .bind(sender_id)
    .bind(receiver_id)
    .fetch_optional(&mut **executor)
    .await
}

/// Conditional transition out of `pending`. Returns None when the exchange
/// is missing or already resolved.
pub async fn set_exchange_status_if_pending(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    status: ExchangeStatus,
) -> Result<Option<Exchange>> {
    sqlx::query_as::<_, Exchange>(
        "UPDATE exchanges SET status = $2 WHERE id = $1 AND status = 'pending' RETURNING *",
    )
    .bind(id)
    .bind(status)
    .fetch_optional(&mut **executor)
    .await
}

// --- Notification queries ---

pub async fn insert_notification(
    executor: &mut SqlxTransaction<'_, Postgres>,
    notification: &Notification,
) -> Result<Notification> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (
            id, sender_id, receiver_id, message, kind, is_read, exchange_id, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(notification.id)
    .bind(notification.sender_id)
    .bind(notification.receiver_id)
    .bind(&notification.message)
    .bind(notification.kind)
    .bind(notification.is_read)
    .bind(notification.exchange_id)
    .bind(notification.created_at)
    .fetch_one(&mut **executor)
    .await
}

pub async fn get_notification(
    pool: &PgPool,
    id: Uuid,
    receiver_id: Uuid,
) -> Result<Option<Notification>> {
    sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE id = $1 AND receiver_id = $2",
    )
    .bind(id)
    .bind(receiver_id)
    .fetch_optional(pool)
    .await
}

pub async fn get_notification_for_receiver(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    receiver_id: Uuid,
) -> Result<Option<Notification>> {
    sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE id = $1 AND receiver_id = $2",
    )
    .bind(id)
    .bind(receiver_id)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn list_unresolved_notifications(
    pool: &PgPool,
    receiver_id: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<Notification>> {
    sqlx::query_as::<_, Notification>(
        r#"
        SELECT * FROM notifications
        WHERE receiver_id = $1 AND kind <> 'resolved'
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(receiver_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn resolve_notification(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Notification> {
    sqlx::query_as::<_, Notification>(
        "UPDATE notifications SET kind = 'resolved', is_read = TRUE WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_one(&mut **executor)
    .await
}

pub async fn resolve_all_notifications(pool: &PgPool, receiver_id: Uuid) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE notifications SET kind = 'resolved', is_read = TRUE WHERE receiver_id = $1",
    )
    .bind(receiver_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

pub async fn resolve_notifications_for_exchange(
    executor: &mut SqlxTransaction<'_, Postgres>,
    exchange_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query(
        "UPDATE notifications SET kind = 'resolved', is_read = TRUE WHERE exchange_id = $1",
    )
    .bind(exchange_id)
    .execute(&mut **executor)
    .await?;
    Ok(result.rows_affected())
}
