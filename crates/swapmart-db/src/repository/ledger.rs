//! # Ledger Repository
//!
//! Append-only settlement history. Entries are written inside the
//! settlement transaction and never updated or deleted; triggers in the
//! schema refuse both.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::generate_id;
use crate::error::DbResult;
use swapmart_core::{LedgerEntry, NewLedgerEntry, Page};

const LEDGER_COLUMNS: &str = "id, owner_id, owner_name, owner_email, owner_phone, counterparty_id, \
                              item_id, item_name, bought, swapped, amount_paid_cents, \
                              balance_available_cents, balance_owed_cents, created_at";

/// Repository for ledger reads.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// A user's settlement history, newest first.
    pub async fn list_for_owner(&self, owner_id: &str, page: Page) -> DbResult<Vec<LedgerEntry>> {
        let sql = format!(
            "SELECT {LEDGER_COLUMNS} FROM ledger_entries WHERE owner_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?"
        );
        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .bind(owner_id)
            .bind(page.limit as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }

    /// Number of entries belonging to `owner_id`.
    pub async fn count_for_owner(&self, owner_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Counts all entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ledger_entries")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

/// Appends one entry on the settlement transaction.
pub async fn append_entry(
    conn: &mut SqliteConnection,
    entry: &NewLedgerEntry,
) -> DbResult<LedgerEntry> {
    let stored = LedgerEntry {
        id: generate_id(),
        party: entry.party.clone(),
        counterparty_id: entry.counterparty_id.clone(),
        item_id: entry.item_id.clone(),
        item_name: entry.item_name.clone(),
        bought: entry.bought,
        swapped: entry.swapped,
        amount_paid_cents: entry.amount_paid.cents(),
        balance_available_cents: entry.balance_available.cents(),
        balance_owed_cents: entry.balance_owed.cents(),
        created_at: Utc::now(),
    };

    let sql = format!(
        "INSERT INTO ledger_entries ({LEDGER_COLUMNS}) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    sqlx::query(&sql)
        .bind(&stored.id)
        .bind(&stored.party.user_id)
        .bind(&stored.party.name)
        .bind(&stored.party.email)
        .bind(&stored.party.phone_number)
        .bind(&stored.counterparty_id)
        .bind(&stored.item_id)
        .bind(&stored.item_name)
        .bind(stored.bought)
        .bind(stored.swapped)
        .bind(stored.amount_paid_cents)
        .bind(stored.balance_available_cents)
        .bind(stored.balance_owed_cents)
        .bind(stored.created_at)
        .execute(&mut *conn)
        .await?;

    debug!(
        entry_id = %stored.id,
        owner_id = %stored.party.user_id,
        item_id = %stored.item_id,
        amount_paid = stored.amount_paid_cents,
        "Ledger entry appended"
    );
    Ok(stored)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::test_support::{item, seeded_db, user};
    use swapmart_core::{Money, PartySnapshot};

    #[tokio::test]
    async fn test_append_and_list() {
        let db = seeded_db().await;
        let ann = user(&db, "ann").await;
        let bob = user(&db, "bob").await;
        let rug = item(&db, &bob, "Rug", 15_000).await;

        let entry = NewLedgerEntry::swap_leg(
            PartySnapshot::from(&ann),
            &bob.id,
            &rug,
            Money::from_cents(5_000),
            Money::zero(),
        );

        let stored = {
            let mut conn = db.pool().acquire().await.unwrap();
            append_entry(&mut conn, &entry).await.unwrap()
        };

        let history = db.ledger().list_for_owner(&ann.id, Page::default()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, stored.id);
        assert_eq!(history[0].owner_id(), ann.id);
        assert_eq!(history[0].party.email, "ann@example.com");
        assert_eq!(history[0].amount_paid(), Money::from_cents(5_000));
        assert_eq!(history[0].item_id, rug.id);
        assert!(history[0].swapped);

        assert_eq!(db.ledger().count_for_owner(&bob.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_entries_are_immutable() {
        let db = seeded_db().await;
        let ann = user(&db, "ann").await;
        let lamp = item(&db, &ann, "Lamp", 1_000).await;

        let mut conn = db.pool().acquire().await.unwrap();
        let stored = append_entry(
            &mut conn,
            &NewLedgerEntry::purchase(PartySnapshot::from(&ann), &lamp, Money::from_cents(1_000), Money::zero()),
        )
        .await
        .unwrap();

        let update = sqlx::query("UPDATE ledger_entries SET amount_paid_cents = 0 WHERE id = ?")
            .bind(&stored.id)
            .execute(&mut *conn)
            .await
            .map_err(DbError::from);
        assert!(update.is_err());

        let delete = sqlx::query("DELETE FROM ledger_entries WHERE id = ?")
            .bind(&stored.id)
            .execute(&mut *conn)
            .await;
        assert!(delete.is_err());
    }
}
