//! Catalog and inventory imports backed by the card-database API.

use sqlx::PgPool;

use crate::cardapi::{CardApiClient, CardApiError};
use crate::db::models::{Card, User, UserCard};
use crate::db::queries;
use crate::error::AppError;
use crate::imports::{parse_inventory, LineError};

/// Finds a catalog card by name, fetching it from the card-database API
/// when it is not known yet. The second element is true when the card was
/// created by this call.
pub async fn ensure_card(
    pool: &PgPool,
    api: &CardApiClient,
    name: &str,
) -> Result<(Card, bool), AppError> {
    if let Some(card) = queries::get_card_by_name(pool, name).await? {
        return Ok((card, false));
    }

    let lookup = api.lookup(name).await.map_err(|e| match e {
        CardApiError::CardNotFound(name) => {
            AppError::NotFound(format!("Card '{}' not found in card database", name))
        }
        other => AppError::CardApi(other.to_string()),
    })?;

    // The fuzzy lookup may have corrected the spelling to a name we already
    // track.
    if let Some(card) = queries::get_card_by_name(pool, &lookup.name).await? {
        return Ok((card, false));
    }

    let card = queries::insert_card(
        pool,
        &Card::new(lookup.name, lookup.description, lookup.price),
    )
    .await?;
    tracing::info!(card = %card.name, "card imported from card database");
    Ok((card, true))
}

#[derive(Debug)]
pub struct InventoryImport {
    pub imported: usize,
    pub skipped: Vec<LineError>,
}

/// Imports an uploaded inventory file into the owner's collection.
/// Malformed lines and cards the API cannot resolve are reported per line;
/// database failures abort the import.
pub async fn import_inventory(
    pool: &PgPool,
    api: &CardApiClient,
    owner: &User,
    text: &str,
) -> Result<InventoryImport, AppError> {
    let parse = parse_inventory(text);
    let mut skipped = parse.errors;
    let mut imported = 0;

    for numbered in parse.lines {
        match ensure_card(pool, api, &numbered.entry.name).await {
            Ok((card, _)) => {
                queries::insert_user_card(
                    pool,
                    &UserCard::new(owner.id, card.id, true, numbered.entry.quantity, 0),
                )
                .await?;
                imported += 1;
            }
            Err(AppError::Database(e)) => return Err(AppError::Database(e)),
            Err(AppError::DatabaseError(e)) => return Err(AppError::DatabaseError(e)),
            Err(other) => skipped.push(LineError {
                line: numbered.line,
                reason: other.to_string(),
            }),
        }
    }

    skipped.sort_by_key(|e| e.line);
    tracing::info!(
        user = %owner.username,
        imported,
        skipped = skipped.len(),
        "inventory upload processed"
    );
    Ok(InventoryImport { imported, skipped })
}

#[derive(Debug)]
pub struct CatalogImportEntry {
    pub name: String,
    pub created: bool,
    pub error: Option<String>,
}

/// Imports catalog cards by name through the card-database API.
pub async fn import_catalog(
    pool: &PgPool,
    api: &CardApiClient,
    names: &[String],
) -> Result<Vec<CatalogImportEntry>, AppError> {
    let mut report = Vec::with_capacity(names.len());

    for name in names {
        match ensure_card(pool, api, name).await {
            Ok((card, created)) => report.push(CatalogImportEntry {
                name: card.name,
                created,
                error: None,
            }),
            Err(AppError::Database(e)) => return Err(AppError::Database(e)),
            Err(AppError::DatabaseError(e)) => return Err(AppError::DatabaseError(e)),
            Err(other) => report.push(CatalogImportEntry {
                name: name.clone(),
                created: false,
                error: Some(other.to_string()),
            }),
        }
    }

    Ok(report)
}
