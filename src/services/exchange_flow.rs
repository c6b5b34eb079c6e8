//! Trade and sale lifecycle: interest notes, trade requests, purchase
//! offers, and the accept/reject transitions on notifications and
//! exchanges. Multi-row writes run inside a single database transaction.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::{
    Exchange, ExchangeKind, ExchangeStatus, Notification, NotificationKind, User,
};
use crate::db::queries;
use crate::error::AppError;

pub fn interest_message(sender: &str, card_name: &str) -> String {
    format!(
        "{} is looking for '{}', want to review their owned cards?",
        sender, card_name
    )
}

pub fn trade_request_message(sender: &str, desired_card: &str, offered_cards: &str) -> String {
    format!("{} offers '{}' for '{}'.", sender, desired_card, offered_cards)
}

pub fn trade_declined_message(username: &str) -> String {
    format!("{} declined the trade.", username)
}

pub fn offer_rejected_message(username: &str) -> String {
    format!("{} rejected your offer.", username)
}

pub fn offer_accepted_message(username: &str) -> String {
    format!("{} accepted your offer.", username)
}

pub fn purchase_offer_message(buyer: &str, card_name: &str) -> String {
    format!("{} wants to buy '{}'.", buyer, card_name)
}

/// "I'm looking for this card" note to one of its owners.
pub async fn send_interest_notification(
    pool: &PgPool,
    sender: &User,
    owner_id: Uuid,
    card_name: &str,
) -> Result<Notification, AppError> {
    let owner = queries::get_user(pool, owner_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("User {} not found", owner_id)))?;

    let mut tx = pool.begin().await?;
    let notification = queries::insert_notification(
        &mut tx,
        &Notification::new(
            sender.id,
            owner.id,
            interest_message(&sender.username, card_name),
            NotificationKind::Action,
            None,
        ),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(
        sender = %sender.username,
        receiver = %owner.username,
        "interest notification sent"
    );
    Ok(notification)
}

#[derive(Debug)]
pub struct TradeRequest {
    pub receiver_id: Uuid,
    pub desired_card: String,
    pub offered_cards: Vec<String>,
    /// Earlier notification this request answers; resolved alongside.
    pub notification_id: Option<Uuid>,
}

/// Files a trade offer: a pending Exchange plus the linked `exchange`
/// notification to the receiver.
pub async fn send_trade_request(
    pool: &PgPool,
    sender: &User,
    request: TradeRequest,
) -> Result<(Exchange, Notification), AppError> {
    if request.offered_cards.is_empty() {
        return Err(AppError::Validation(
            "offered_cards: select one or more cards to trade".to_string(),
        ));
    }

    let receiver = queries::get_user(pool, request.receiver_id).await.map_err(|e| {
        AppError::from_lookup(e, format!("User {} not found", request.receiver_id))
    })?;

    let offered = request.offered_cards.join(", ");

    let mut tx = pool.begin().await?;

    let exchange = queries::insert_exchange(
        &mut tx,
        &Exchange::new(
            sender.id,
            receiver.id,
            offered.clone(),
            request.desired_card.clone(),
            ExchangeKind::Trade,
        ),
    )
    .await?;

    let notification = queries::insert_notification(
        &mut tx,
        &Notification::new(
            sender.id,
            receiver.id,
            trade_request_message(&sender.username, &request.desired_card, &offered),
            NotificationKind::Exchange,
            Some(exchange.id),
        ),
    )
    .await?;

    if let Some(answered_id) = request.notification_id {
        let answered = queries::get_notification_for_receiver(&mut tx, answered_id, sender.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Notification {} not found", answered_id))
            })?;
        queries::resolve_notification(&mut tx, answered.id).await?;
    }

    tx.commit().await?;

    tracing::info!(
        exchange_id = %exchange.id,
        sender = %sender.username,
        receiver = %receiver.username,
        "trade request created"
    );
    Ok((exchange, notification))
}

#[derive(Debug)]
pub struct AcceptOutcome {
    pub notification: Notification,
    /// For `exchange` notifications: the earliest pending exchange between
    /// the pair, when one still exists.
    pub pending_exchange: Option<Exchange>,
    pub sender_id: Uuid,
}

/// Resolves a notification addressed to `receiver`. For exchange
/// notifications the matching pending Exchange is located by (sender,
/// receiver, pending) and handed back so the caller can act on it.
pub async fn accept_notification(
    pool: &PgPool,
    receiver: &User,
    notification_id: Uuid,
) -> Result<AcceptOutcome, AppError> {
    let mut tx = pool.begin().await?;

    let notification = queries::get_notification_for_receiver(&mut tx, notification_id, receiver.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", notification_id)))?;

    let resolved = queries::resolve_notification(&mut tx, notification.id).await?;

    let pending_exchange = if notification.kind == NotificationKind::Exchange {
        queries::find_pending_exchange_between(&mut tx, notification.sender_id, receiver.id).await?
    } else {
        None
    };

    tx.commit().await?;

    Ok(AcceptOutcome {
        sender_id: resolved.sender_id,
        notification: resolved,
        pending_exchange,
    })
}

/// Resolves a notification and tells the original sender it was turned
/// down. The underlying Exchange, if any, is left untouched on this path.
pub async fn reject_notification(
    pool: &PgPool,
    receiver: &User,
    notification_id: Uuid,
    offer: bool,
) -> Result<Notification, AppError> {
    let mut tx = pool.begin().await?;

    let notification = queries::get_notification_for_receiver(&mut tx, notification_id, receiver.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", notification_id)))?;

    let resolved = queries::resolve_notification(&mut tx, notification.id).await?;

    let message = if offer {
        offer_rejected_message(&receiver.username)
    } else {
        trade_declined_message(&receiver.username)
    };
    queries::insert_notification(
        &mut tx,
        &Notification::new(
            receiver.id,
            notification.sender_id,
            message,
            NotificationKind::Info,
            None,
        ),
    )
    .await?;

    tx.commit().await?;
    Ok(resolved)
}

/// Pending -> accepted, receiver only. Linked notifications are resolved
/// and the sender is informed.
pub async fn accept_exchange(
    pool: &PgPool,
    user: &User,
    exchange_id: Uuid,
) -> Result<Exchange, AppError> {
    transition_exchange(
        pool,
        user,
        exchange_id,
        ExchangeStatus::Accepted,
        offer_accepted_message(&user.username),
    )
    .await
}

/// Pending -> rejected, receiver only.
pub async fn reject_exchange(
    pool: &PgPool,
    user: &User,
    exchange_id: Uuid,
) -> Result<Exchange, AppError> {
    transition_exchange(
        pool,
        user,
        exchange_id,
        ExchangeStatus::Rejected,
        offer_rejected_message(&user.username),
    )
    .await
}

async fn transition_exchange(
    pool: &PgPool,
    user: &User,
    exchange_id: Uuid,
    status: ExchangeStatus,
    sender_message: String,
) -> Result<Exchange, AppError> {
    let exchange = queries::get_exchange(pool, exchange_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("Exchange {} not found", exchange_id)))?;

    if exchange.receiver_id != user.id {
        return Err(AppError::Forbidden(
            "Only the receiver can resolve an exchange".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let updated = queries::set_exchange_status_if_pending(&mut tx, exchange_id, status)
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Exchange {} is no longer pending", exchange_id))
        })?;

    queries::resolve_notifications_for_exchange(&mut tx, exchange_id).await?;

    queries::insert_notification(
        &mut tx,
        &Notification::new(
            user.id,
            exchange.sender_id,
            sender_message,
            NotificationKind::Info,
            Some(exchange_id),
        ),
    )
    .await?;

    tx.commit().await?;

    tracing::info!(exchange_id = %exchange_id, status = ?updated.status, "exchange resolved");
    Ok(updated)
}

#[derive(Debug)]
pub struct PurchaseOffer {
    pub owner_id: Uuid,
    pub card_name: String,
}

/// Files a purchase offer: a pending sale Exchange plus the linked
/// `compra` notification to the card's owner.
pub async fn make_purchase_offer(
    pool: &PgPool,
    buyer: &User,
    offer: PurchaseOffer,
) -> Result<(Exchange, Notification), AppError> {
    let owner = queries::get_user(pool, offer.owner_id)
        .await
        .map_err(|e| AppError::from_lookup(e, format!("User {} not found", offer.owner_id)))?;

    let mut tx = pool.begin().await?;

    let exchange = queries::insert_exchange(
        &mut tx,
        &Exchange::new(
            buyer.id,
            owner.id,
            String::new(),
            offer.card_name.clone(),
            ExchangeKind::Sale,
        ),
    )
    .await?;

    let notification = queries::insert_notification(
        &mut tx,
        &Notification::new(
            buyer.id,
            owner.id,
            purchase_offer_message(&buyer.username, &offer.card_name),
            NotificationKind::Purchase,
            Some(exchange.id),
        ),
    )
    .await?;

    tx.commit().await?;
    Ok((exchange, notification))
}

/// First single-quoted segment of a notification message; how the desired
/// card travels inside interest and trade texts.
pub fn quoted_card_name(message: &str) -> Option<String> {
    message.split('\'').nth(1).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_the_actors_and_cards() {
        assert_eq!(
            trade_request_message("ana", "Counterspell", "Lightning Bolt, Shock"),
            "ana offers 'Counterspell' for 'Lightning Bolt, Shock'."
        );
        assert_eq!(trade_declined_message("ana"), "ana declined the trade.");
        assert_eq!(offer_rejected_message("ana"), "ana rejected your offer.");
        assert_eq!(
            purchase_offer_message("ana", "Counterspell"),
            "ana wants to buy 'Counterspell'."
        );
    }

    #[test]
    fn quoted_card_name_extracts_first_segment() {
        let message = interest_message("ana", "Lightning Bolt");
        assert_eq!(quoted_card_name(&message).as_deref(), Some("Lightning Bolt"));
    }

    #[test]
    fn quoted_card_name_handles_unquoted_messages() {
        assert_eq!(quoted_card_name("no quotes here"), None);
    }
}
